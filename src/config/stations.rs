use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// A live radio station.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Station {
    /// Short identifier used on the command line.
    pub id: String,

    /// Display name.
    pub name: String,

    /// HLS playlist URL of the live stream.
    #[schemars(with = "String")]
    pub url: Url,
}

const DEFAULT_STATIONS: [(&str, &str, &str); 2] = [
    (
        "r1",
        "CBC Radio One",
        "https://cbcliveradio-lh.akamaihd.net/i/CBCR1_TOR@118420/master.m3u8",
    ),
    (
        "cbcmusic",
        "CBC Music",
        "https://cbcliveradio2-lh.akamaihd.net/i/CBCR2_TOR@382863/master.m3u8",
    ),
];

/// The stations shipped with the app.
pub fn default_stations() -> Vec<Station> {
    DEFAULT_STATIONS
        .iter()
        .filter_map(|(id, name, url)| {
            Url::parse(url).ok().map(|url| Station {
                id: (*id).to_string(),
                name: (*name).to_string(),
                url,
            })
        })
        .collect()
}
