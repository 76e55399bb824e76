/// Election id used by the demo commands
pub const DEMO_ELECTION_ID: &str = "demo-election";

pub const DEMO_ELECTION_TITLE: &str = "Demo General Election";

/// (id, name, party acronym, displayed vote count)
pub const DEMO_CANDIDATES: &[(&str, &str, &str, u64)] = &[
    ("cand-1", "Amina Bello", "PDP", 1204),
    ("cand-2", "Tunde Okafor", "APC", 987),
    ("cand-3", "Chioma Eze", "LP", 1530),
];

pub const DEMO_VOTER_ID: &str = "demo-voter";
pub const DEMO_DEVICE_ID: &str = "demo-device";
pub const DEMO_POSITION: &str = "president";
