use url::Url;

const ARCHIVE_SUFFIX: &str = ".zip";

/// Local archive name: `explicit` or the last path segment of `download_url`,
/// with `.zip` appended unless it already ends in `.zip`.
pub fn archive_file_name(explicit: Option<&str>, download_url: &str) -> Option<String> {
    let base = match explicit {
        Some(name) => name.trim().to_string(),
        None => last_path_segment(download_url)?,
    };
    if base.is_empty() || base == "." || base == ".." || base.contains(['/', '\\']) {
        return None;
    }
    if has_archive_suffix(&base) {
        Some(base)
    } else {
        Some(format!("{base}{ARCHIVE_SUFFIX}"))
    }
}

fn last_path_segment(download_url: &str) -> Option<String> {
    match Url::parse(download_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(ToOwned::to_owned))
            .map(|segment| percent_decode(&segment)),
        // Not absolute: treat as a plain path.
        Err(_) => download_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(ToOwned::to_owned),
    }
}

fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn has_archive_suffix(name: &str) -> bool {
    name.len() > ARCHIVE_SUFFIX.len()
        && name
            .get(name.len() - ARCHIVE_SUFFIX.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ARCHIVE_SUFFIX))
}
