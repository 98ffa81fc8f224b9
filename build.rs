use shadow_rs::BuildPattern;
use shadow_rs::ShadowBuilder;
use shadow_rs::ShadowError;

/// Generates the `build` module used for `maze --version`.
fn main() -> Result<(), ShadowError> {
    ShadowBuilder::builder()
        .build_pattern(BuildPattern::Lazy)
        .deny_const(Default::default())
        .build()?;

    Ok(())
}
