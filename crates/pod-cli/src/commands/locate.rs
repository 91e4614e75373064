use anyhow::Result;

use super::ClientContext;

/// Best effort: an unresolvable postal code prints `resolved=false` and exits 0.
pub fn locate(ctx: &ClientContext, postal_code: &str) -> Result<()> {
    let resolver = ctx.geocoder()?;
    match resolver.resolve(postal_code) {
        Some(d) => {
            println!("resolved=true");
            println!("country={}", d.country());
            println!("state_province={}", d.state_province());
            println!("postal_code={}", d.postal_code());
        }
        None => {
            println!("resolved=false");
            println!("postal_code={}", postal_code.trim());
        }
    }
    Ok(())
}
