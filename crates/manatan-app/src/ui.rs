use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncReceiver;
use manatan_config::Config;
use manatan_core::chapter::ChapterButton;
use manatan_core::preprocess::to_display;
use manatan_core::subtitle::SubtitleTimeline;
use manatan_types::{AppEvent, ChapterStatus, OverlayStatus};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What the running command waits for before exiting.
#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
    Regions { source_key: String },
    Lookup,
    Subtitles { at: f64 },
    Chapter { chapter_path: String, process: bool },
    Jimaku,
    Nothing,
}

impl Goal {
    /// Whether `event` settles the command.
    pub fn is_done(&self, event: &AppEvent) -> bool {
        match (self, event) {
            (_, AppEvent::Failed { .. }) => true,
            (Goal::Regions { source_key }, AppEvent::RegionsReady { source_key: key, .. }) => {
                key == source_key
            }
            (
                Goal::Regions { source_key },
                AppEvent::OcrStatusUpdate {
                    source_key: key,
                    status,
                },
            ) => key == source_key && matches!(status, OverlayStatus::Error | OverlayStatus::Idle),
            (Goal::Lookup, AppEvent::ShowResults(_) | AppEvent::LookupWarmingUp) => true,
            (Goal::Subtitles { .. }, AppEvent::SubtitlesLoaded { .. }) => true,
            (
                Goal::Chapter {
                    chapter_path,
                    process,
                },
                AppEvent::ChapterStatusUpdate {
                    chapter_path: path,
                    status,
                },
            ) => {
                path == chapter_path
                    && match status {
                        ChapterStatus::Processed => true,
                        ChapterStatus::Idle => !process,
                        ChapterStatus::Processing { .. } => !process,
                    }
            }
            (Goal::Jimaku, AppEvent::JimakuFiles(_)) => true,
            _ => false,
        }
    }
}

/// Human-readable lines for one event.
pub fn render(goal: &Goal, event: &AppEvent, config: &Config) -> Vec<String> {
    match event {
        AppEvent::OcrStatusUpdate { source_key, status } => {
            vec![format!("{source_key}: {}", status.as_str())]
        }
        AppEvent::RegionsReady { regions, .. } => {
            let mut lines = vec![format!("{} regions", regions.len())];
            lines.extend(regions.iter().enumerate().map(|(i, r)| {
                format!(
                    "[{i}] ({:.3}, {:.3}, {:.3}x{:.3}) {}",
                    r.bbox.x.get(),
                    r.bbox.y.get(),
                    r.bbox.w.get(),
                    r.bbox.h.get(),
                    to_display(&r.text).replace('\n', " / ")
                )
            }));
            lines
        }
        AppEvent::LookupWarmingUp => vec!["Dictionary is still loading, try again".to_string()],
        AppEvent::ShowResults(entries) if entries.is_empty() => vec!["No results".to_string()],
        AppEvent::ShowResults(entries) => entries
            .iter()
            .flat_map(|entry| {
                let head = match &entry.reading {
                    Some(reading) if reading != &entry.headword => {
                        format!("{} 【{reading}】", entry.headword)
                    }
                    _ => entry.headword.clone(),
                };
                std::iter::once(head).chain(entry.definitions.iter().map(|d| {
                    format!("  {}: {}", d.dictionary_name, d.content.join("; "))
                }))
            })
            .collect(),
        AppEvent::SubtitlesLoaded { url, cues } => {
            let at = match goal {
                Goal::Subtitles { at } => *at,
                _ => 0.0,
            };
            let timeline = SubtitleTimeline::new(cues.clone(), config.subtitle.offset_ms);
            let mut lines = vec![format!("{url}: {} cues", timeline.cues().len())];
            let active = timeline.active_at(at);
            if active.is_empty() {
                lines.push(format!("{at:.2}s: (no caption)"));
            }
            lines.extend(
                active
                    .iter()
                    .map(|cue| format!("{:.2}-{:.2}s: {}", cue.start, cue.end, cue.text)),
            );
            lines.push(format!(
                "previous {:.2}s, next {:.2}s",
                timeline.previous_seek(at, None),
                timeline.next_seek(at, None)
            ));
            lines
        }
        AppEvent::JimakuFiles(files) if files.is_empty() => {
            vec!["No subtitle files found".to_string()]
        }
        AppEvent::JimakuFiles(files) => files
            .iter()
            .map(|f| format!("{} ({} bytes) {}", f.name, f.size, f.url))
            .collect(),
        AppEvent::ChapterStatusUpdate {
            chapter_path,
            status,
        } => vec![format!(
            "{chapter_path}: {}",
            ChapterButton::from(*status).label()
        )],
        AppEvent::Failed { context, message } => vec![format!("{context} failed: {message}")],
        _ => Vec::new(),
    }
}

/// Prints app events until the goal settles. Gives up after
/// `timeout_seconds` without any event.
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    config: Arc<RwLock<Config>>,
    goal: Goal,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if goal == Goal::Nothing {
        return Ok(());
    }

    let (delta_time, idle_limit) = {
        let config = config.read().await;
        (
            Duration::from_millis(config.delta_time.max(1)),
            Duration::from_secs(config.network.timeout_seconds.max(1)),
        )
    };
    let mut tick = tokio::time::interval(delta_time);
    let mut last_event = Instant::now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tick.tick() => {
                if last_event.elapsed() > idle_limit {
                    anyhow::bail!("no response within {}s", idle_limit.as_secs());
                }
            }
            event = app_to_ui_rx.recv() => {
                let event = event?;
                last_event = Instant::now();
                let lines = {
                    let config = config.read().await;
                    render(&goal, &event, &config)
                };
                for line in lines {
                    println!("{line}");
                }
                if goal.is_done(&event) {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use manatan_types::{DefinitionBlock, DictionaryEntry, SubtitleCue};

    use super::*;

    #[test]
    fn chapter_goal_waits_for_processed_when_processing() {
        let goal = Goal::Chapter {
            chapter_path: "/manga/1/chapter/1".into(),
            process: true,
        };
        let update = |status| AppEvent::ChapterStatusUpdate {
            chapter_path: "/manga/1/chapter/1".into(),
            status,
        };
        assert!(!goal.is_done(&update(ChapterStatus::Processing {
            progress: 1,
            total: 4
        })));
        assert!(goal.is_done(&update(ChapterStatus::Processed)));

        let check = Goal::Chapter {
            chapter_path: "/manga/1/chapter/1".into(),
            process: false,
        };
        assert!(check.is_done(&update(ChapterStatus::Idle)));
    }

    #[test]
    fn regions_goal_ignores_loading_and_other_keys() {
        let goal = Goal::Regions {
            source_key: "a".into(),
        };
        let status = |key: &str, status| AppEvent::OcrStatusUpdate {
            source_key: key.into(),
            status,
        };
        assert!(!goal.is_done(&status("a", OverlayStatus::Loading)));
        assert!(!goal.is_done(&status("b", OverlayStatus::Error)));
        assert!(goal.is_done(&status("a", OverlayStatus::Error)));
    }

    #[test]
    fn renders_lookup_entries() {
        let event = AppEvent::ShowResults(vec![DictionaryEntry {
            headword: "猫".into(),
            reading: Some("ねこ".into()),
            term_tags: None,
            definitions: vec![DefinitionBlock {
                tags: None,
                dictionary_name: "JMdict".into(),
                content: vec!["cat".into(), "feline".into()],
            }],
        }]);
        let lines = render(&Goal::Lookup, &event, &Config::default());
        assert_eq!(lines, vec!["猫 【ねこ】", "  JMdict: cat; feline"]);
    }

    #[test]
    fn renders_active_caption_with_offset() {
        let mut config = Config::default();
        config.subtitle.offset_ms = 500;
        let event = AppEvent::SubtitlesLoaded {
            url: "ep1.srt".into(),
            cues: vec![
                SubtitleCue {
                    start: 1.0,
                    end: 2.0,
                    text: "一".into(),
                },
                SubtitleCue {
                    start: 3.0,
                    end: 4.0,
                    text: "二".into(),
                },
            ],
        };
        let lines = render(&Goal::Subtitles { at: 2.7 }, &event, &config);
        assert_eq!(lines[0], "ep1.srt: 2 cues");
        assert_eq!(lines[1], "3.00-4.00s: 二");
    }
}
