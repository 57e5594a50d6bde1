//! A full encrypt -> vote -> close -> tally -> verify round trip over
//! randomly generated ballots, exercised through this crate's public
//! `Poll`/`tally` surface rather than the bare encrypt/tally primitives.

use ballot_engine::{
    classifier::SecurityOptions,
    clock::MonotonicClock,
    encoder::VoteIntent,
    homomorphic::generate_keypair_with_default_rng,
    member::{Authority, Voter},
    tally, Poll, VotingMethod,
};
use proptest::prelude::ProptestConfig;
use test_strategy::{proptest, Arbitrary};

const VOTING_OPTIONS: usize = 3;

#[derive(Arbitrary, Debug)]
struct Ballot {
    #[strategy(0..3_usize)]
    choice: usize,
}

#[proptest(ProptestConfig::with_cases(8))]
fn plurality_round_trip(ballots: [Ballot; 30]) {
    let authority = Authority::generate(b"property-test-authority".to_vec());
    let keys = generate_keypair_with_default_rng();
    let mut clock = MonotonicClock::new();
    let mut rng = ballot_engine::crypto::rng::default_rng();

    let mut poll = Poll::new(
        b"property-test-poll".to_vec(),
        vec!["A".into(), "B".into(), "C".into()],
        VotingMethod::Plurality,
        &authority,
        keys.public_key,
        None,
        SecurityOptions::default(),
        &mut clock,
    )
    .unwrap();

    let mut receipts = Vec::with_capacity(ballots.len());
    for (i, ballot) in ballots.iter().enumerate() {
        let voter = Voter::new(vec![i as u8, (i >> 8) as u8]);
        let intent = VoteIntent {
            choice_index: Some(ballot.choice),
            ..Default::default()
        };
        let receipt = poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
        assert!(poll.verify_receipt(&voter, &receipt));
        receipts.push((voter, receipt));
    }
    poll.close(&authority, &mut clock).unwrap();
    assert!(poll.audit_log().verify_chain());

    let results = tally::tally(&poll, &keys.private_key, ballots.len() as u64).unwrap();

    let mut expected = vec![0u64; VOTING_OPTIONS];
    for ballot in &ballots {
        expected[ballot.choice] += 1;
    }
    assert_eq!(results.tallies, expected);
    assert_eq!(results.voter_count, ballots.len());

    for (voter, receipt) in &receipts {
        assert!(poll.verify_receipt(voter, receipt));
    }
}

#[derive(Arbitrary, Debug)]
struct WeightedBallot {
    #[strategy(0..2_usize)]
    choice: usize,
    #[strategy(1..100_u64)]
    weight: u64,
}

#[proptest(ProptestConfig::with_cases(8))]
fn weighted_round_trip_respects_the_cap(ballots: [WeightedBallot; 20]) {
    let authority = Authority::generate(b"property-test-authority-2".to_vec());
    let keys = generate_keypair_with_default_rng();
    let mut clock = MonotonicClock::new();
    let mut rng = ballot_engine::crypto::rng::default_rng();

    let mut poll = Poll::new(
        b"property-test-weighted-poll".to_vec(),
        vec!["A".into(), "B".into()],
        VotingMethod::Weighted,
        &authority,
        keys.public_key,
        Some(100),
        SecurityOptions::default(),
        &mut clock,
    )
    .unwrap();

    let mut expected = vec![0u64; 2];
    for (i, ballot) in ballots.iter().enumerate() {
        let voter = Voter::new(vec![i as u8, (i >> 8) as u8]);
        let intent = VoteIntent {
            choice_index: Some(ballot.choice),
            weight: Some(ballot.weight),
            ..Default::default()
        };
        poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
        expected[ballot.choice] += ballot.weight;
    }
    poll.close(&authority, &mut clock).unwrap();

    let results = tally::tally(&poll, &keys.private_key, expected.iter().sum()).unwrap();
    assert_eq!(results.tallies, expected);
}
