//! four-player table demo
//!
//! runs the full card protocol over a standard deck:
//! 1. key generation + key ownership proofs
//! 2. aggregate key
//! 3. masking the deck
//! 4. shuffle + prove (each player), verified by the others
//! 5. dealing two hole cards per player and revealing them

use dl_cards::{
    compute_aggregate_key, compute_reveal_token, keygen, mask_deck, prove_key_ownership,
    random_masking_factors, shuffle_and_remask, unmask, verify_shuffle, CardProtocolError,
    DeckEncoding, Parameters, Permutation, ShuffleStatement,
};
use rand::rngs::OsRng;
use std::time::Instant;

const NUM_PLAYERS: usize = 4;
const CARDS_PER_PLAYER: usize = 13;

const RANKS: [&str; 13] = ["2", "3", "4", "5", "6", "7", "8", "9", "T", "J", "Q", "K", "A"];
const SUITS: [&str; 4] = ["c", "d", "h", "s"];

fn card_name(index: u32) -> String {
    let i = index as usize;
    format!("{}{}", RANKS[i % 13], SUITS[i / 13])
}

fn main() -> Result<(), CardProtocolError> {
    println!("=== dl-cards table demo ===\n");

    let mut rng = OsRng;
    let pp = Parameters::new(CARDS_PER_PLAYER, NUM_PLAYERS)?;

    // phase 1: keys
    println!("phase 1: key generation");
    let keys: Vec<_> = (0..NUM_PLAYERS).map(|_| keygen(&mut rng, &pp)).collect();
    let mut announced = Vec::with_capacity(NUM_PLAYERS);
    for (i, (pk, sk)) in keys.iter().enumerate() {
        let info = format!("seat-{}", i);
        let proof = prove_key_ownership(&mut rng, &pp, pk, sk, info.as_bytes())?;
        println!("  seat {}: pk = {:02x?}...", i, &pk.to_bytes()[..8]);
        announced.push((*pk, proof, info));
    }

    // phase 2: aggregate key
    let shared_key = compute_aggregate_key(&pp, &announced)?;
    println!("\nphase 2: aggregate key {:02x?}...\n", &shared_key.to_bytes()[..8]);

    // phase 3: masking
    println!("phase 3: masking {} cards", pp.deck_size());
    let encoding = DeckEncoding::standard();
    let cards = encoding.cards();
    let alphas = random_masking_factors(&mut rng, cards.len());
    let start = Instant::now();
    let mut deck: Vec<_> = mask_deck(&mut rng, &pp, &shared_key, &cards, &alphas)?
        .into_iter()
        .map(|(masked, _)| masked)
        .collect();
    println!("  masked in {:?}\n", start.elapsed());

    // phase 4: shuffles
    println!("phase 4: shuffle rounds");
    for seat in 0..NUM_PLAYERS {
        let perm = Permutation::random(&mut rng, pp.deck_size());
        let factors = random_masking_factors(&mut rng, pp.deck_size());

        let start = Instant::now();
        let (shuffled, proof) =
            shuffle_and_remask(&mut rng, &pp, &shared_key, &deck, &perm, &factors)?;
        let prove_time = start.elapsed();

        let start = Instant::now();
        let statement = ShuffleStatement::new(shared_key, &deck, &shuffled);
        let valid = verify_shuffle(&pp, &statement, &proof)?;
        let verify_time = start.elapsed();

        println!(
            "  seat {}: prove {:?}, verify {:?}, {} bytes, valid = {}",
            seat,
            prove_time,
            verify_time,
            proof.to_bytes().len(),
            valid
        );
        if !valid {
            println!("  aborting: shuffle from seat {} rejected", seat);
            return Ok(());
        }
        deck = shuffled;
    }

    // phase 5: deal and reveal hole cards
    println!("\nphase 5: hole cards");
    for seat in 0..NUM_PLAYERS {
        let mut hand = Vec::with_capacity(2);
        for masked in &deck[2 * seat..2 * seat + 2] {
            let tokens = keys
                .iter()
                .map(|(pk, sk)| -> Result<_, CardProtocolError> {
                    let (token, proof) = compute_reveal_token(&mut rng, &pp, sk, pk, masked)?;
                    Ok((token, proof, *pk))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let card = unmask(&pp, &tokens, masked, Some(&encoding))?;
            hand.push(card_name(card.index.get()));
        }
        println!("  seat {}: {}", seat, hand.join(" "));
    }

    println!("\n=== done ===");
    Ok(())
}
