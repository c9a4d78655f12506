//Goal of this bin is to create the config consumed by election_simulation:
// - Voter roster (pseudonymous ids) ---- (election_config.json)
// - Candidate list --------------------- (election_config.json)
// - Key sizes, decoy batch count ------- (election_config.json, defaults)
use std::env;
use blind_signature_system::utils::ballot::random_token;
use blind_signature_system::ElectionConfig;

const VOTER_ID_LEN: usize = 40;

fn main() {
    let voter_count: usize = env::args().nth(1).and_then(|n| n.parse().ok()).unwrap_or(10);
    let output = env::args().nth(2).unwrap_or_else(|| "election_config.json".to_string());

    println!("-------------");
    println!("STEP1: Building voter roster and candidate list.");
    let voters: Vec<String> = (0..voter_count).map(|_| random_token(VOTER_ID_LEN)).collect();
    let candidates: Vec<String> = ["Alena Novakova", "Bohdan Kral", "Cyril Dvorak"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    println!("-------------");
    println!("STEP1 - DONE. {} voters, {} candidates.", voters.len(), candidates.len());
    println!("-------------");

    println!("STEP2: Writing {}.", output);
    let config = ElectionConfig::new(voters, candidates);
    config.validate().expect("Generated config is invalid");
    config.to_file(&output).expect("Failed to write election config");
    println!("-------------");
    println!("STEP2 - DONE.");
    println!("-------------");
}
