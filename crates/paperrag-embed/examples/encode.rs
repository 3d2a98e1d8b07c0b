use paperrag_core::config::Config;
use paperrag_embed::Encoders;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "stem cell regeneration in microgravity".to_string());
    let settings = Config::load()?.get("encoders")?;
    let encoders = Encoders::load(&settings)?;
    let t = encoders.text.encode(&query)?;
    let i = encoders.image.encode(&query)?;
    println!("text dim={} image dim={}", t.dim(), i.dim());
    Ok(())
}
