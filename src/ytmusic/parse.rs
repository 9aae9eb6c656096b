//! Extraction of tracks and playlists from YouTube Music InnerTube responses.
//!
//! Responses are deeply nested renderer trees whose layout shifts between
//! client versions, so everything here is lenient: anything that cannot be
//! located is simply left out.

use serde_json::Value;

use crate::catalog::PlaylistSummary;
use crate::matcher::{AlbumRef, ArtistRef, YtmRawTrack, parse_duration};
use crate::track::AlbumInfo;

const TOP_RESULT: &str = "Top result";
const LIKED_MUSIC_BROWSE_ID: &str = "VLLM";
const SEPARATOR: &str = " • ";
const ALBUM_PLAYLIST_PREFIX: &str = "OLAK5uy_";
const FLEX: &str = "musicResponsiveListItemFlexColumnRenderer";
const FIXED: &str = "musicResponsiveListItemFixedColumnRenderer";
const BROWSE_ID: &[&str] = &["navigationEndpoint", "browseEndpoint", "browseId"];

const SEARCH_SECTIONS: &[&str] = &[
    "contents",
    "tabbedSearchResultsRenderer",
    "tabs",
    "0",
    "tabRenderer",
    "content",
    "sectionListRenderer",
    "contents",
];

const PLAYLIST_SHELF_PATHS: &[&[&str]] = &[
    &[
        "contents",
        "twoColumnBrowseResultsRenderer",
        "secondaryContents",
        "sectionListRenderer",
        "contents",
        "0",
        "musicPlaylistShelfRenderer",
        "contents",
    ],
    &[
        "contents",
        "singleColumnBrowseResultsRenderer",
        "tabs",
        "0",
        "tabRenderer",
        "content",
        "sectionListRenderer",
        "contents",
        "0",
        "musicPlaylistShelfRenderer",
        "contents",
    ],
];

const PLAYLIST_TITLE_PATHS: &[&[&str]] = &[
    &[
        "contents",
        "twoColumnBrowseResultsRenderer",
        "tabs",
        "0",
        "tabRenderer",
        "content",
        "sectionListRenderer",
        "contents",
        "0",
        "musicResponsiveHeaderRenderer",
        "title",
        "runs",
        "0",
        "text",
    ],
    &[
        "contents",
        "twoColumnBrowseResultsRenderer",
        "tabs",
        "0",
        "tabRenderer",
        "content",
        "sectionListRenderer",
        "contents",
        "0",
        "musicEditablePlaylistDetailHeaderRenderer",
        "header",
        "musicResponsiveHeaderRenderer",
        "title",
        "runs",
        "0",
        "text",
    ],
    &["header", "musicDetailHeaderRenderer", "title", "runs", "0", "text"],
    &[
        "header",
        "musicEditablePlaylistDetailHeaderRenderer",
        "header",
        "musicDetailHeaderRenderer",
        "title",
        "runs",
        "0",
        "text",
    ],
];

const LIBRARY_GRID_ITEMS: &[&str] = &[
    "contents",
    "singleColumnBrowseResultsRenderer",
    "tabs",
    "0",
    "tabRenderer",
    "content",
    "sectionListRenderer",
    "contents",
    "0",
    "gridRenderer",
    "items",
];

const WATCH_VIDEO_TYPE: &[&str] = &[
    "watchEndpointMusicSupportedConfigs",
    "watchEndpointMusicConfig",
    "musicVideoType",
];

/// Walk a JSON tree; numeric segments index into arrays.
fn nav<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| match current {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(*key),
        _ => None,
    })
}

fn nav_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    nav(value, path).and_then(Value::as_str)
}

fn nav_array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    nav(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn page_type(run: &Value) -> Option<&str> {
    nav_str(
        run,
        &[
            "navigationEndpoint",
            "browseEndpoint",
            "browseEndpointContextSupportedConfigs",
            "browseEndpointContextMusicConfig",
            "pageType",
        ],
    )
}

fn looks_like_duration(text: &str) -> bool {
    text.contains(':') && parse_duration(text).is_ok()
}

fn looks_like_year(text: &str) -> bool {
    text.len() == 4 && text.chars().all(|c| c.is_ascii_digit())
}

fn shelf_result_type(category: &str) -> String {
    let lower = category.to_lowercase();
    match lower.as_str() {
        "songs" => "song".to_string(),
        "videos" => "video".to_string(),
        "albums" => "album".to_string(),
        "artists" => "artist".to_string(),
        "podcasts" => "podcast".to_string(),
        "episodes" => "episode".to_string(),
        "profiles" => "profile".to_string(),
        _ if lower.contains("playlist") => "playlist".to_string(),
        _ => lower,
    }
}

/// Details pulled out of a row of `text.runs` (artists, album, duration).
#[derive(Debug, Default)]
struct RunDetails {
    artists: Vec<ArtistRef>,
    album: Option<AlbumRef>,
    duration: Option<String>,
    year: Option<String>,
    leading_type: Option<String>,
}

fn run_details(runs: &[&Value]) -> RunDetails {
    let mut details = RunDetails::default();
    let mut plain_texts = Vec::new();

    for (i, run) in runs.iter().enumerate() {
        let Some(text) = run.get("text").and_then(Value::as_str) else {
            continue;
        };
        if text == SEPARATOR || text.trim().is_empty() {
            continue;
        }

        match page_type(run) {
            Some("MUSIC_PAGE_TYPE_ARTIST") | Some("MUSIC_PAGE_TYPE_USER_CHANNEL") => {
                details.artists.push(ArtistRef { name: text.to_string() });
            }
            Some("MUSIC_PAGE_TYPE_ALBUM") => {
                details.album = Some(AlbumRef { name: text.to_string() });
            }
            _ if looks_like_duration(text) => details.duration = Some(text.to_string()),
            _ if looks_like_year(text) => details.year = Some(text.to_string()),
            _ if i == 0
                && matches!(text, "Song" | "Video" | "Album" | "Single" | "EP" | "Artist") =>
            {
                details.leading_type = Some(text.to_lowercase());
            }
            _ => plain_texts.push(text),
        }
    }

    // Channels of user uploads are often not linked
    if details.artists.is_empty() {
        if let Some(first) = plain_texts.first() {
            details.artists.push(ArtistRef { name: first.to_string() });
        }
    }

    details
}

fn column_runs<'a>(
    renderer: &'a Value,
    columns: &str,
    renderer_key: &str,
    from: usize,
) -> Vec<&'a Value> {
    nav_array(renderer, &[columns])
        .iter()
        .skip(from)
        .flat_map(|column| nav_array(column, &[renderer_key, "text", "runs"]))
        .collect()
}

fn list_item(
    renderer: &Value,
    result_type: Option<&str>,
    category: Option<&str>,
) -> Option<YtmRawTrack> {
    let title_run = nav(renderer, &["flexColumns", "0", FLEX, "text", "runs", "0"])?;
    let title = title_run.get("text").and_then(Value::as_str)?;

    let play_endpoint = nav(
        renderer,
        &[
            "overlay",
            "musicItemThumbnailOverlayRenderer",
            "content",
            "musicPlayButtonRenderer",
            "playNavigationEndpoint",
            "watchEndpoint",
        ],
    );

    let video_id = nav_str(renderer, &["playlistItemData", "videoId"])
        .or_else(|| nav_str(title_run, &["navigationEndpoint", "watchEndpoint", "videoId"]))
        .or_else(|| play_endpoint.and_then(|e| nav_str(e, &["videoId"])));

    let video_type = play_endpoint
        .and_then(|e| nav_str(e, WATCH_VIDEO_TYPE))
        .or_else(|| {
            nav(title_run, &["navigationEndpoint", "watchEndpoint"])
                .and_then(|e| nav_str(e, WATCH_VIDEO_TYPE))
        });

    let details = run_details(&column_runs(renderer, "flexColumns", FLEX, 1));
    let fixed_duration = column_runs(renderer, "fixedColumns", FIXED, 0)
        .first()
        .and_then(|run| run.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(YtmRawTrack {
        video_id: video_id.map(str::to_string),
        title: Some(title.to_string()),
        artists: details.artists,
        album: details.album,
        duration: details.duration.or(fixed_duration),
        duration_seconds: None,
        result_type: result_type.map(str::to_string).or(details.leading_type),
        category: category.map(str::to_string),
        video_type: video_type.map(str::to_string),
    })
}

fn top_result(card: &Value) -> Option<YtmRawTrack> {
    let title_run = nav(card, &["title", "runs", "0"])?;
    let title = title_run.get("text").and_then(Value::as_str)?;
    let watch = nav(title_run, &["navigationEndpoint", "watchEndpoint"]);

    let runs: Vec<&Value> = nav_array(card, &["subtitle", "runs"]).iter().collect();
    let details = run_details(&runs);

    let result_type = match (watch, details.leading_type) {
        (Some(_), Some(kind)) => kind,
        (Some(_), None) => "song".to_string(),
        // Artist or album cards have no watch endpoint
        (None, _) => page_type(title_run)
            .map(|p| p.trim_start_matches("MUSIC_PAGE_TYPE_").to_lowercase())
            .unwrap_or_else(|| "unknown".to_string()),
    };

    Some(YtmRawTrack {
        video_id: watch.and_then(|w| nav_str(w, &["videoId"])).map(str::to_string),
        title: Some(title.to_string()),
        artists: details.artists,
        album: details.album,
        duration: details.duration,
        duration_seconds: None,
        result_type: Some(result_type),
        category: Some(TOP_RESULT.to_string()),
        video_type: watch.and_then(|w| nav_str(w, WATCH_VIDEO_TYPE)).map(str::to_string),
    })
}

/// Every result of an unfiltered search, top result first, in page order.
pub fn search_results(response: &Value) -> Vec<YtmRawTrack> {
    let mut results = Vec::new();

    for section in nav_array(response, SEARCH_SECTIONS) {
        if let Some(card) = section.get("musicCardShelfRenderer") {
            results.extend(top_result(card));
        }

        if let Some(shelf) = section.get("musicShelfRenderer") {
            let category = nav_str(shelf, &["title", "runs", "0", "text"]);
            let result_type = category.map(shelf_result_type);

            results.extend(
                nav_array(shelf, &["contents"])
                    .iter()
                    .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
                    .filter_map(|renderer| list_item(renderer, result_type.as_deref(), category)),
            );
        }
    }

    results
}

pub fn playlist_title(response: &Value) -> Option<String> {
    PLAYLIST_TITLE_PATHS
        .iter()
        .find_map(|path| nav_str(response, path))
        .map(str::to_string)
}

/// Playlist entries in order. Entries without a video id are tracks that
/// are no longer available.
pub fn playlist_items(response: &Value) -> Vec<Option<YtmRawTrack>> {
    let contents = PLAYLIST_SHELF_PATHS
        .iter()
        .map(|path| nav_array(response, path))
        .find(|items| !items.is_empty())
        .unwrap_or_default();

    contents
        .iter()
        .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
        .map(|renderer| list_item(renderer, None, None).filter(|track| track.video_id.is_some()))
        .collect()
}

/// Playlists in the user's library. Liked music is left out.
pub fn library_playlists(response: &Value) -> Vec<PlaylistSummary> {
    nav_array(response, LIBRARY_GRID_ITEMS)
        .iter()
        .filter_map(|item| item.get("musicTwoRowItemRenderer"))
        .filter_map(|renderer| {
            let browse_id = nav_str(renderer, BROWSE_ID)?;
            if browse_id == LIKED_MUSIC_BROWSE_ID {
                return None;
            }
            let id = browse_id.strip_prefix("VL")?;
            let name = nav_str(renderer, &["title", "runs", "0", "text"])?;

            let total_tracks = nav_array(renderer, &["subtitle", "runs"])
                .last()
                .and_then(|run| run.get("text"))
                .and_then(Value::as_str)
                .and_then(|text| text.split_whitespace().next())
                .and_then(|count| count.replace(',', "").parse::<usize>().ok())
                .unwrap_or(0);

            Some(PlaylistSummary {
                id: id.to_string(),
                name: name.to_string(),
                total_tracks,
            })
        })
        .collect()
}

fn album_from_runs(title: &str, browse_id: &str, runs: &[&Value]) -> Option<AlbumInfo> {
    let details = run_details(runs);
    let artist = details.artists.first()?;
    Some(AlbumInfo::new(title, &artist.name, details.year.as_deref(), browse_id))
}

/// Album rows of an album-filtered search.
pub fn album_results(response: &Value) -> Vec<AlbumInfo> {
    nav_array(response, SEARCH_SECTIONS)
        .iter()
        .filter_map(|section| section.get("musicShelfRenderer"))
        .flat_map(|shelf| nav_array(shelf, &["contents"]))
        .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
        .filter_map(|renderer| {
            let title =
                nav_str(renderer, &["flexColumns", "0", FLEX, "text", "runs", "0", "text"])?;
            let browse_id = nav_str(renderer, BROWSE_ID)?;
            album_from_runs(title, browse_id, &column_runs(renderer, "flexColumns", FLEX, 1))
        })
        .collect()
}

/// Albums saved in the user's library.
pub fn library_albums(response: &Value) -> Vec<AlbumInfo> {
    nav_array(response, LIBRARY_GRID_ITEMS)
        .iter()
        .filter_map(|item| item.get("musicTwoRowItemRenderer"))
        .filter_map(|renderer| {
            let title_run = nav(renderer, &["title", "runs", "0"])?;
            let title = title_run.get("text").and_then(Value::as_str)?;
            let browse_id =
                nav_str(renderer, BROWSE_ID).or_else(|| nav_str(title_run, BROWSE_ID))?;
            let runs: Vec<&Value> = nav_array(renderer, &["subtitle", "runs"]).iter().collect();
            album_from_runs(title, browse_id, &runs)
        })
        .collect()
}

fn find_album_playlist_id(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map
            .get("playlistId")
            .and_then(Value::as_str)
            .filter(|id| id.starts_with(ALBUM_PLAYLIST_PREFIX))
            .or_else(|| map.values().find_map(find_album_playlist_id)),
        Value::Array(items) => items.iter().find_map(find_album_playlist_id),
        _ => None,
    }
}

/// Id of the audio playlist behind an album page, which is what gets liked
/// when an album is saved.
pub fn album_playlist_id(response: &Value) -> Option<String> {
    find_album_playlist_id(response).map(str::to_string)
}
