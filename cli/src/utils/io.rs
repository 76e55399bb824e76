use serde::Serialize;

/// Pretty-print any serializable report to stdout
pub fn print_json<T: Serialize>(label: &str, value: &T) -> anyhow::Result<()> {
    println!("== {} ==", label);
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
