use std::env;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use env_logger::{Builder, Target};
use futures_util::future::join_all;
use log::LevelFilter::Info;
use log::{error, info, warn};
use rand::Rng;
use tokio::task::spawn_blocking;
use blind_signature_system::{ElectionAuthority, ElectionConfig, Result, VoterAgent};

type SessionResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Runs CPU-heavy protocol work on the blocking pool so sessions don't starve each other.
async fn blocking<T, F>(work: F) -> SessionResult<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match spawn_blocking(work).await {
        Ok(outcome) => Ok(outcome?),
        Err(e) => {
            error!("Worker task failed: {}", e);
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Error> {
    let mut builder = Builder::new();
    builder.filter(None, Info);
    builder.target(Target::Stdout);

    builder.init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "election_config.json".to_string());
    let config = ElectionConfig::from_file(&config_path)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    info!("Generating authority keys.");
    let authority_config = config.clone();
    let authority = blocking(move || ElectionAuthority::from_config(&authority_config))
        .await
        .map_err(|e| Error::new(ErrorKind::Other, e))?;
    let authority = Arc::new(authority);

    let mut rng = rand::thread_rng();
    let sessions: Vec<_> = config
        .voters
        .iter()
        .map(|voter_id| {
            let choice = rng.gen_range(1..=config.candidates.len());
            tokio::spawn(run_session(authority.clone(), voter_id.clone(), choice, config.decoy_batches))
        })
        .collect();

    let mut expected = vec![0u64; config.candidates.len()];
    for outcome in join_all(sessions).await {
        match outcome {
            Ok(Ok(choice)) => expected[choice - 1] += 1,
            Ok(Err(e)) => warn!("Voting session failed: {}", e),
            Err(e) => error!("Voting session panicked: {}", e),
        }
    }

    let results = authority.get_results();
    println!("---------------------------------------------------------------");
    println!("Results:");
    for candidate in &results.tally {
        println!("{:>24}: {}", candidate.name, candidate.vote_count);
    }
    match results.winner() {
        Some(winner) => println!("Most votes: {}", winner.name),
        None => println!("No votes were counted."),
    }
    println!(
        "Turnout: {} of {} ({:.1}%)",
        results.turnout,
        authority.voter_count(),
        results.turnout_percentage(authority.voter_count())
    );
    println!("---------------------------------------------------------------");
    println!("Counted ballots:");
    for (ballot_id, text) in &results.ledger {
        println!("  {}: {}", ballot_id, text);
    }

    let counted: Vec<u64> = results.tally.iter().map(|c| c.vote_count).collect();
    if counted != expected {
        error!("Tally {:?} does not match the votes cast {:?}", counted, expected);
        return Err(Error::new(ErrorKind::Other, "tally mismatch"));
    }
    info!("Tally matches every vote cast.");
    Ok(())
}

/// One voter from registration through to a counted ballot. Returns the candidate voted for.
async fn run_session(
    authority: Arc<ElectionAuthority>,
    voter_id: String,
    choice: usize,
    decoy_batches: usize,
) -> SessionResult<usize> {
    let mut agent = VoterAgent::new(
        &voter_id,
        authority.candidate_count(),
        authority.signing_key().clone(),
        authority.communication_key().clone(),
    );
    let (agent, registration) = blocking(move || {
        let registration = agent.prepare_registration(decoy_batches, choice)?;
        Ok((agent, registration))
    })
    .await?;

    let registrar = authority.clone();
    let blind_signature = blocking(move || registrar.register(&registration)).await?;
    info!("Voter {} received a blind signature", voter_id);

    let submission = blocking(move || {
        let cast = agent.cast_vote(choice, &blind_signature)?;
        agent.seal_vote(&cast)
    })
    .await?;

    let counter = authority.clone();
    blocking(move || counter.submit_vote(&submission)).await?;
    Ok(choice)
}
