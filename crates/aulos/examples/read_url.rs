//! Read tags from a URL given on the command line and print them as JSON.
//!
//! ```sh
//! cargo run --example read_url -- https://example.com/track.ogg
//! ```

use aulos::TagValue;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let arg = std::env::args().nth(1).expect("usage: read_url <url>");
    let url = url::Url::parse(&arg)?;

    let tags = aulos::read(url).await?;

    println!("format: {}", tags.format);
    for (name, value) in &tags.tags {
        match value {
            TagValue::Text(text) => println!("{name}: {text}"),
            TagValue::Picture(picture) => {
                println!("{name}: {} ({} bytes)", picture.format, picture.data.len());
            }
            TagValue::Pictures(pictures) => {
                for picture in pictures {
                    println!(
                        "{name}: {} \"{}\" ({} bytes)",
                        picture.format,
                        picture.description,
                        picture.data.len()
                    );
                }
            }
        }
    }
    Ok(())
}
