//! end-to-end games over the full protocol

use curve25519_dalek::scalar::Scalar;
use rand::{rngs::OsRng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{
    compute_aggregate_key, compute_reveal_token, curve::random_scalar, keygen, mask_deck,
    prove_key_ownership, random_masking_factors, shuffle_and_remask, unmask, verify_mask,
    verify_shuffle, AggregatePublicKey, Card, CardProtocolError, DeckEncoding, MaskedCard,
    Parameters, Permutation, PlayerPublicKey, PlayerSecretKey, RevealProof, RevealToken,
    ShuffleProof, ShuffleStatement,
};

struct Player {
    pk: PlayerPublicKey,
    sk: PlayerSecretKey,
}

struct Game {
    pp: Parameters,
    players: Vec<Player>,
    shared_key: AggregatePublicKey,
    encoding: DeckEncoding,
}

/// keygen + key ownership + aggregate key for `n` players
fn setup_game<R: rand::RngCore + rand::CryptoRng>(rng: &mut R, m: usize, n: usize) -> Game {
    let pp = Parameters::new(m, n).unwrap();

    let players: Vec<Player> = (0..n)
        .map(|_| {
            let (pk, sk) = keygen(rng, &pp);
            Player { pk, sk }
        })
        .collect();

    let announced: Vec<_> = players
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let info = format!("player-{}", i).into_bytes();
            let proof = prove_key_ownership(rng, &pp, &p.pk, &p.sk, &info).unwrap();
            (p.pk, proof, info)
        })
        .collect();

    let shared_key = compute_aggregate_key(&pp, &announced).unwrap();
    let encoding = DeckEncoding::new(pp.deck_size());

    Game {
        pp,
        players,
        shared_key,
        encoding,
    }
}

/// mask the plaintext deck and check every masking proof
fn mask_initial_deck<R: rand::RngCore + rand::CryptoRng>(
    rng: &mut R,
    game: &Game,
) -> Vec<MaskedCard> {
    let cards = game.encoding.cards();
    let alphas: Vec<Scalar> = (0..cards.len()).map(|_| random_scalar(rng)).collect();
    let masked = mask_deck(rng, &game.pp, &game.shared_key, &cards, &alphas).unwrap();

    for (card, (m, proof)) in cards.iter().zip(&masked) {
        assert!(verify_mask(&game.pp, &game.shared_key, card, m, proof).unwrap());
    }
    masked.into_iter().map(|(m, _)| m).collect()
}

fn reveal_tokens<R: rand::RngCore + rand::CryptoRng>(
    rng: &mut R,
    game: &Game,
    masked: &MaskedCard,
) -> Vec<(RevealToken, RevealProof, PlayerPublicKey)> {
    game.players
        .iter()
        .map(|p| {
            let (token, proof) = compute_reveal_token(rng, &game.pp, &p.sk, &p.pk, masked).unwrap();
            (token, proof, p.pk)
        })
        .collect()
}

/// one shuffle round, verified by everyone else
fn shuffle_round<R: rand::RngCore + rand::CryptoRng>(
    rng: &mut R,
    game: &Game,
    deck: &[MaskedCard],
) -> (Vec<MaskedCard>, Permutation, ShuffleProof) {
    let n = game.pp.deck_size();
    let perm = Permutation::random(rng, n);
    let factors = random_masking_factors(rng, n);
    let (shuffled, proof) =
        shuffle_and_remask(rng, &game.pp, &game.shared_key, deck, &perm, &factors).unwrap();

    let statement = ShuffleStatement::new(game.shared_key, deck, &shuffled);
    assert!(verify_shuffle(&game.pp, &statement, &proof).unwrap());

    (shuffled, perm, proof)
}

#[test]
fn test_full_game_eight_cards_four_players() {
    let mut rng = OsRng;
    let game = setup_game(&mut rng, 2, 4);
    assert_eq!(game.pp.deck_size(), 8);

    let deck = mask_initial_deck(&mut rng, &game);
    let (shuffled, perm, _) = shuffle_round(&mut rng, &game, &deck);

    let expected: Vec<Card> = perm.apply(&game.encoding.cards()).unwrap();
    for (masked, want) in shuffled.iter().zip(&expected) {
        let tokens = reveal_tokens(&mut rng, &game, masked);
        let card = unmask(&game.pp, &tokens, masked, Some(&game.encoding)).unwrap();
        assert_eq!(card, *want);
    }
}

#[test]
fn test_every_player_shuffles() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xdeca);
    let game = setup_game(&mut rng, 3, 4);

    let mut deck = mask_initial_deck(&mut rng, &game);
    let mut plaintext = game.encoding.cards();

    // each player shuffles in turn
    for _ in 0..game.players.len() {
        let (shuffled, perm, _) = shuffle_round(&mut rng, &game, &deck);
        plaintext = perm.apply(&plaintext).unwrap();
        deck = shuffled;
    }

    for (masked, want) in deck.iter().zip(&plaintext) {
        let tokens = reveal_tokens(&mut rng, &game, masked);
        assert_eq!(unmask(&game.pp, &tokens, masked, Some(&game.encoding)).unwrap(), *want);
    }
}

#[test]
fn test_stale_proof_rejected_for_next_round() {
    let mut rng = OsRng;
    let game = setup_game(&mut rng, 2, 2);
    let deck = mask_initial_deck(&mut rng, &game);

    let (first, _, first_proof) = shuffle_round(&mut rng, &game, &deck);
    let (second, _, _) = shuffle_round(&mut rng, &game, &first);

    // replaying round one's proof against round two's decks
    let statement = ShuffleStatement::new(game.shared_key, &first, &second);
    assert!(!verify_shuffle(&game.pp, &statement, &first_proof).unwrap());
}

#[test]
fn test_missing_player_cannot_reveal() {
    let mut rng = OsRng;
    let game = setup_game(&mut rng, 2, 4);
    let deck = mask_initial_deck(&mut rng, &game);
    let (shuffled, _, _) = shuffle_round(&mut rng, &game, &deck);

    let tokens = reveal_tokens(&mut rng, &game, &shuffled[0]);
    assert_eq!(
        unmask(&game.pp, &tokens[..3], &shuffled[0], Some(&game.encoding)),
        Err(CardProtocolError::InsufficientRevealTokens { got: 3, need: 4 })
    );
}

#[test]
fn test_corrupted_shuffle_proof_bytes() {
    let mut rng = OsRng;
    let game = setup_game(&mut rng, 2, 2);
    let deck = mask_initial_deck(&mut rng, &game);
    let (shuffled, _, proof) = shuffle_round(&mut rng, &game, &deck);
    let statement = ShuffleStatement::new(game.shared_key, &deck, &shuffled);

    // flip a bit in the first coefficient commitment: either the point no
    // longer decodes or the challenge changes
    let mut bytes = proof.to_bytes();
    bytes[4] ^= 0x02;
    if let Ok(tampered) = ShuffleProof::from_bytes(&bytes) {
        assert!(!verify_shuffle(&game.pp, &statement, &tampered).unwrap());
    }

    // a truncated proof never decodes
    assert!(ShuffleProof::from_bytes(&bytes[..bytes.len() - 32]).is_err());
}

#[test]
fn test_tokens_from_other_table_do_not_decrypt() {
    let mut rng = OsRng;
    let game = setup_game(&mut rng, 1, 3);
    let other = setup_game(&mut rng, 1, 3);

    let deck = mask_initial_deck(&mut rng, &game);
    let tokens = reveal_tokens(&mut rng, &other, &deck[0]);

    // valid proofs for the other table's keys, but the card does not decrypt
    let card = unmask(&game.pp, &tokens, &deck[0], Some(&game.encoding)).unwrap();
    assert_ne!(card, game.encoding.cards()[0]);
}
