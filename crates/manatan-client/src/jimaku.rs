//! Subtitle search against the Jimaku API: pick the entry that best matches
//! a show title, then narrow its files down to one episode.

use std::sync::LazyLock;

use manatan_types::SubtitleFile;
use regex::Regex;
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::{ClientError, JimakuSearch};

/// Score given to an exact normalized title match, above any fuzzy score.
const EXACT_MATCH_SCORE: f64 = 1.2;
const SUBSTRING_BONUS: f64 = 0.15;

static JAPANESE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第\s*([0-9]+)\s*話").expect("valid regex"));
static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)s[0-9]{1,2}e([0-9]{1,3})").expect("valid regex"));
static BRACKET_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\[(]\s*([0-9]{1,3})(?:v[0-9]+)?\s*[\])]").expect("valid regex")
});
static HYPHEN_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-\s*([0-9]{1,3})(?:v[0-9]+)?(?:[^0-9A-Za-z_]|$)").expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryFlags {
    #[serde(default)]
    pub anime: Option<bool>,
    #[serde(default)]
    pub movie: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JimakuEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub japanese_name: Option<String>,
    #[serde(default)]
    pub anilist_id: Option<u64>,
    #[serde(default)]
    pub flags: EntryFlags,
}

impl JimakuEntry {
    fn titles(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.english_name.as_deref())
            .chain(self.japanese_name.as_deref())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeQuery {
    pub title: Option<String>,
    pub anilist_id: Option<u64>,
    pub episode: u32,
}

/// The two raw calls the search flow is built from.
#[async_trait::async_trait]
pub trait JimakuApi: Send + Sync {
    async fn search_entries(
        &self,
        query: Option<&str>,
        anilist_id: Option<u64>,
    ) -> Result<Vec<JimakuEntry>, ClientError>;

    /// All files of an entry, or only those the server tags with `episode`.
    async fn entry_files(
        &self,
        entry_id: u64,
        episode: Option<u32>,
    ) -> Result<Vec<SubtitleFile>, ClientError>;
}

pub struct JimakuClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl JimakuClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

#[async_trait::async_trait]
impl JimakuApi for JimakuClient {
    async fn search_entries(
        &self,
        query: Option<&str>,
        anilist_id: Option<u64>,
    ) -> Result<Vec<JimakuEntry>, ClientError> {
        let mut params = vec![("anime", "true".to_string())];
        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("query", query.to_string()));
        }
        if let Some(id) = anilist_id {
            params.push(("anilist_id", id.to_string()));
        }
        let response = self.get("/entries/search").query(&params).send().await?;
        Ok(ClientError::check("Jimaku search", response)?
            .json()
            .await?)
    }

    async fn entry_files(
        &self,
        entry_id: u64,
        episode: Option<u32>,
    ) -> Result<Vec<SubtitleFile>, ClientError> {
        let mut request = self.get(&format!("/entries/{entry_id}/files"));
        if let Some(episode) = episode {
            request = request.query(&[("episode", episode.to_string())]);
        }
        let response = request.send().await?;
        Ok(ClientError::check("Jimaku files", response)?
            .json()
            .await?)
    }
}

#[async_trait::async_trait]
impl JimakuSearch for JimakuClient {
    async fn episode_files(&self, query: &EpisodeQuery) -> Result<Vec<SubtitleFile>, ClientError> {
        if self.api_key.trim().is_empty() {
            tracing::debug!("no Jimaku API key configured");
            return Ok(Vec::new());
        }
        resolve_episode_files(self, query).await
    }
}

/// Search, choose an entry and return the files for the requested episode.
pub async fn resolve_episode_files<A: JimakuApi + ?Sized>(
    api: &A,
    query: &EpisodeQuery,
) -> Result<Vec<SubtitleFile>, ClientError> {
    let entries = api
        .search_entries(query.title.as_deref(), query.anilist_id)
        .await?;

    let mut candidates = entries;
    if let Some(id) = query.anilist_id {
        let matched: Vec<JimakuEntry> = candidates
            .iter()
            .filter(|e| e.anilist_id == Some(id))
            .cloned()
            .collect();
        if !matched.is_empty() {
            candidates = matched;
        }
    }
    let pool = choose_entry_pool(candidates);
    let Some(entry) = pick_best_entry(&pool, query.title.as_deref()) else {
        return Ok(Vec::new());
    };
    tracing::debug!(entry = entry.id, name = %entry.name, "Jimaku entry chosen");

    let episode_files = api.entry_files(entry.id, Some(query.episode)).await?;
    let tagged = filter_episode_matches(&episode_files, query.episode);
    if !tagged.matches.is_empty() {
        return Ok(tagged.matches);
    }

    let all_files = api.entry_files(entry.id, None).await?;
    let all = filter_episode_matches(&all_files, query.episode);
    if !all.matches.is_empty() {
        return Ok(all.matches);
    }
    if all.has_episode_tags {
        return Ok(Vec::new());
    }
    if !episode_files.is_empty() {
        return Ok(episode_files);
    }
    Ok(all_files)
}

/// Lowercase ASCII letters and digits only, after compatibility folding.
pub fn normalize_title(value: &str) -> String {
    value
        .nfkc()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

pub fn levenshtein(source: &str, target: &str) -> usize {
    if source == target {
        return 0;
    }
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();
    if source.is_empty() {
        return target.len();
    }
    if target.is_empty() {
        return source.len();
    }

    let mut previous: Vec<usize> = (0..=target.len()).collect();
    let mut current = vec![0; target.len() + 1];
    for (i, s) in source.iter().enumerate() {
        current[0] = i + 1;
        for (j, t) in target.iter().enumerate() {
            let cost = usize::from(s != t);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[target.len()]
}

pub fn similarity_score(source: &str, target: &str) -> f64 {
    let source = normalize_title(source);
    let target = normalize_title(target);
    if source.is_empty() || target.is_empty() {
        return 0.0;
    }
    if source == target {
        return EXACT_MATCH_SCORE;
    }

    let max_len = source.len().max(target.len());
    let similarity = 1.0 - levenshtein(&source, &target) as f64 / max_len as f64;
    let bonus = if source.contains(&target) || target.contains(&source) {
        SUBSTRING_BONUS
    } else {
        0.0
    };
    similarity + bonus
}

/// Narrow entries to TV anime when the flags allow it.
pub fn choose_entry_pool(entries: Vec<JimakuEntry>) -> Vec<JimakuEntry> {
    let anime_series: Vec<JimakuEntry> = entries
        .iter()
        .filter(|e| e.flags.anime == Some(true) && e.flags.movie != Some(true))
        .cloned()
        .collect();
    if !anime_series.is_empty() {
        return anime_series;
    }
    let non_movie: Vec<JimakuEntry> = entries
        .iter()
        .filter(|e| e.flags.movie == Some(false))
        .cloned()
        .collect();
    if !non_movie.is_empty() {
        return non_movie;
    }
    let anime: Vec<JimakuEntry> = entries
        .iter()
        .filter(|e| e.flags.anime == Some(true))
        .cloned()
        .collect();
    if !anime.is_empty() {
        return anime;
    }
    entries
}

pub fn pick_best_entry<'a>(
    entries: &'a [JimakuEntry],
    title: Option<&str>,
) -> Option<&'a JimakuEntry> {
    let first = entries.first()?;
    let Some(title) = title.filter(|t| !t.is_empty()) else {
        return Some(first);
    };

    let mut best = first;
    let mut best_score = -1.0;
    for entry in entries {
        let score = entry
            .titles()
            .map(|candidate| similarity_score(candidate, title))
            .fold(0.0, f64::max);
        if score > best_score {
            best_score = score;
            best = entry;
        }
    }
    Some(best)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeTags {
    pub japanese: Option<u32>,
    pub season_episode: Option<u32>,
    /// `[NN]` or `- NN`, bracket form first.
    pub general: Option<u32>,
}

fn capture_number(re: &Regex, name: &str) -> Option<u32> {
    re.captures(name)?.get(1)?.as_str().parse().ok()
}

pub fn parse_episode_tags(name: &str) -> EpisodeTags {
    EpisodeTags {
        japanese: capture_number(&JAPANESE_EPISODE, name),
        season_episode: capture_number(&SEASON_EPISODE, name),
        general: capture_number(&BRACKET_EPISODE, name)
            .or_else(|| capture_number(&HYPHEN_EPISODE, name)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeMatch {
    pub matches: Vec<SubtitleFile>,
    pub has_episode_tags: bool,
}

/// The most specific tag family present in any file name decides which
/// matches count.
pub fn filter_episode_matches(files: &[SubtitleFile], episode: u32) -> EpisodeMatch {
    let tags: Vec<EpisodeTags> = files.iter().map(|f| parse_episode_tags(&f.name)).collect();

    let families: [fn(&EpisodeTags) -> Option<u32>; 3] = [
        |t| t.japanese,
        |t| t.season_episode,
        |t| t.general,
    ];
    for family in families {
        if tags.iter().any(|t| family(t).is_some()) {
            let matches = files
                .iter()
                .zip(&tags)
                .filter(|(_, t)| family(t) == Some(episode))
                .map(|(f, _)| f.clone())
                .collect();
            return EpisodeMatch {
                matches,
                has_episode_tags: true,
            };
        }
    }
    EpisodeMatch::default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    fn file(name: &str) -> SubtitleFile {
        SubtitleFile {
            url: format!("https://jimaku.cc/files/{name}"),
            name: name.to_string(),
            size: 0,
            last_modified: String::new(),
        }
    }

    fn entry(id: u64, name: &str, anime: Option<bool>, movie: Option<bool>) -> JimakuEntry {
        JimakuEntry {
            id,
            name: name.to_string(),
            english_name: None,
            japanese_name: None,
            anilist_id: None,
            flags: EntryFlags { anime, movie },
        }
    }

    #[test]
    fn normalization_folds_width_and_punctuation() {
        assert_eq!(normalize_title("Ｓｐｙ×Family: Part 2"), "spyfamilypart2");
        assert_eq!(normalize_title("進撃の巨人"), "");
    }

    #[test]
    fn similarity_rewards_exact_and_substring() {
        assert_eq!(similarity_score("Frieren", "frieren!"), EXACT_MATCH_SCORE);
        assert_eq!(similarity_score("進撃の巨人", "Attack on Titan"), 0.0);

        let partial = similarity_score("Sousou no Frieren", "Frieren");
        let unrelated = similarity_score("Bocchi the Rock", "Frieren");
        assert!(partial > unrelated);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn pool_prefers_tv_anime() {
        let entries = vec![
            entry(1, "Show Movie", Some(true), Some(true)),
            entry(2, "Show", Some(true), None),
            entry(3, "Show Drama", Some(false), Some(false)),
        ];
        let pool = choose_entry_pool(entries.clone());
        assert_eq!(pool.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);

        let no_anime = vec![entries[0].clone(), entries[2].clone()];
        assert_eq!(choose_entry_pool(no_anime)[0].id, 3);
    }

    #[test]
    fn best_entry_uses_all_titles() {
        let mut a = entry(1, "Boku no Kokoro no Yabai Yatsu", Some(true), None);
        a.english_name = Some("The Dangers in My Heart".into());
        let b = entry(2, "Yubisaki to Renren", Some(true), None);
        let entries = vec![b, a];
        assert_eq!(
            pick_best_entry(&entries, Some("The Dangers in My Heart")).map(|e| e.id),
            Some(1)
        );
        assert_eq!(pick_best_entry(&entries, None).map(|e| e.id), Some(2));
        assert!(pick_best_entry(&[], Some("x")).is_none());
    }

    #[test]
    fn episode_tags_by_family() {
        assert_eq!(parse_episode_tags("葬送のフリーレン 第12話.srt").japanese, Some(12));
        assert_eq!(parse_episode_tags("Frieren.S01E07.ja.srt").season_episode, Some(7));
        assert_eq!(parse_episode_tags("[Group] Frieren [05v2].ass").general, Some(5));
        assert_eq!(parse_episode_tags("Frieren - 09 (1080p).ass").general, Some(9));
        assert_eq!(parse_episode_tags("Frieren - 1234.ass").general, None);
    }

    #[test]
    fn japanese_family_wins_over_general() {
        let files = vec![
            file("Show 第3話.srt"),
            file("Show [03].srt"),
            file("Show 第4話.srt"),
        ];
        let result = filter_episode_matches(&files, 3);
        assert!(result.has_episode_tags);
        assert_eq!(result.matches, vec![file("Show 第3話.srt")]);

        let untagged = filter_episode_matches(&[file("Show.srt")], 3);
        assert!(!untagged.has_episode_tags);
        assert!(untagged.matches.is_empty());
    }

    #[derive(Default)]
    struct FakeApi {
        entries: Vec<JimakuEntry>,
        files: HashMap<(u64, Option<u32>), Vec<SubtitleFile>>,
        calls: Mutex<Vec<Option<u32>>>,
    }

    #[async_trait::async_trait]
    impl JimakuApi for FakeApi {
        async fn search_entries(
            &self,
            _query: Option<&str>,
            _anilist_id: Option<u64>,
        ) -> Result<Vec<JimakuEntry>, ClientError> {
            Ok(self.entries.clone())
        }

        async fn entry_files(
            &self,
            entry_id: u64,
            episode: Option<u32>,
        ) -> Result<Vec<SubtitleFile>, ClientError> {
            self.calls.lock().unwrap().push(episode);
            Ok(self
                .files
                .get(&(entry_id, episode))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn query(episode: u32) -> EpisodeQuery {
        EpisodeQuery {
            title: Some("Frieren".into()),
            anilist_id: None,
            episode,
        }
    }

    #[tokio::test]
    async fn tagged_episode_files_short_circuit() {
        let mut api = FakeApi {
            entries: vec![entry(7, "Frieren", Some(true), None)],
            ..FakeApi::default()
        };
        api.files
            .insert((7, Some(2)), vec![file("Frieren - 02.srt"), file("Frieren - 03.srt")]);

        let files = resolve_episode_files(&api, &query(2)).await.unwrap();
        assert_eq!(files, vec![file("Frieren - 02.srt")]);
        assert_eq!(*api.calls.lock().unwrap(), vec![Some(2)]);
    }

    #[tokio::test]
    async fn falls_back_to_all_files() {
        let mut api = FakeApi {
            entries: vec![entry(7, "Frieren", Some(true), None)],
            ..FakeApi::default()
        };
        api.files.insert(
            (7, None),
            vec![file("Frieren 第1話.srt"), file("Frieren 第2話.srt")],
        );
        let files = resolve_episode_files(&api, &query(2)).await.unwrap();
        assert_eq!(files, vec![file("Frieren 第2話.srt")]);

        // Tagged, but not this episode.
        assert!(resolve_episode_files(&api, &query(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn untagged_files_are_returned_as_is() {
        let mut api = FakeApi {
            entries: vec![entry(7, "Frieren", Some(true), None)],
            ..FakeApi::default()
        };
        api.files.insert((7, Some(4)), vec![file("frieren.ass")]);
        let files = resolve_episode_files(&api, &query(4)).await.unwrap();
        assert_eq!(files, vec![file("frieren.ass")]);
    }

    #[tokio::test]
    async fn no_entries_no_files() {
        let api = FakeApi::default();
        assert!(resolve_episode_files(&api, &query(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_skips_search() {
        let client = JimakuClient::new("http://127.0.0.1:9", "  ");
        assert!(client.episode_files(&query(1)).await.unwrap().is_empty());
    }
}
