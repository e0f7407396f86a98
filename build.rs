use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Exposes VERGEN_BUILD_TIMESTAMP and VERGEN_RUSTC_SEMVER to the crate
    EmitBuilder::builder()
        .build_timestamp()
        .rustc_semver()
        .emit()?;
    Ok(())
}
