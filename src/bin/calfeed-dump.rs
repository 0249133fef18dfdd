use std::error::Error;

use calfeed::Feed;


#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let url = match std::env::args().nth(1) {
        Some(url) => url,
        None => return Err("Usage: calfeed-dump <URL>".into()),
    };

    let mut feed = Feed::new(&url)?;
    if let Err(err) = feed.fetch(false).await {
        log::error!("Unable to fetch {}: {}", url, err);
        return Err(err.into());
    }

    calfeed::utils::print_entry_list(&feed);
    Ok(())
}
