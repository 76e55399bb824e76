use vote_pipeline::ElectionStatus;

pub fn parse_status(s: &str) -> Result<ElectionStatus, String> {
    match s.to_lowercase().as_str() {
        "upcoming" => Ok(ElectionStatus::Upcoming),
        "ongoing" => Ok(ElectionStatus::Ongoing),
        "completed" => Ok(ElectionStatus::Completed),
        "cancelled" => Ok(ElectionStatus::Cancelled),
        _ => Err(format!("invalid election status: {}", s)),
    }
}

/// Failure rate in `[0, 1]`
pub fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("invalid rate: {e}"))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(format!("rate must be between 0 and 1, got {}", rate));
    }
    Ok(rate)
}
