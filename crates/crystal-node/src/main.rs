use std::error::Error;
use tracing::info;

/// Print the manifest of every node this crate registers, for hosts that
/// load nodes from a manifest file.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let registry = crystal_node::registry();
    info!("Registered {} node(s)", registry.len());

    println!("{}", serde_json::to_string_pretty(&registry.manifest())?);

    Ok(())
}
