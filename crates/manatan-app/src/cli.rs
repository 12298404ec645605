use clap::{Parser, Subcommand};
use manatan_core::offset::utf16_to_byte_offset;
use manatan_types::AppEvent;

use crate::ui::Goal;

#[derive(Parser, Debug)]
#[command(name = "manatan", version, about = "OCR overlay and subtitle lookup client")]
pub struct Cli {
    /// Profile name under the profile directory
    #[arg(long, global = true, default_value = "main")]
    pub profile: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Debug-level logs unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recognize text regions on an image
    Ocr { url: String },
    /// Dictionary lookup at a UTF-16 offset into the text
    Lookup {
        text: String,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Load a subtitle file and show the captions active at a time
    Subtitles {
        source: String,
        #[arg(long, default_value_t = 0.0)]
        at: f64,
    },
    /// Check (or start) OCR preprocessing for a chapter path
    Chapter {
        path: String,
        #[arg(long)]
        process: bool,
    },
    /// Search Jimaku for an episode's subtitle files
    Jimaku {
        title: String,
        #[arg(long)]
        episode: u32,
        #[arg(long)]
        anilist_id: Option<u64>,
    },
    /// Create a profile cloned from main
    NewProfile { name: String },
}

impl Command {
    /// Event that starts the command, or `None` for local-only commands.
    pub fn initial_event(&self) -> Option<AppEvent> {
        match self {
            Command::Ocr { url } => Some(AppEvent::FetchOcr {
                source_key: url.clone(),
            }),
            Command::Lookup { text, offset } => Some(AppEvent::Lookup {
                text: text.clone(),
                byte_offset: utf16_to_byte_offset(text, *offset),
            }),
            Command::Subtitles { source, .. } => Some(AppEvent::LoadSubtitles {
                url: source.clone(),
            }),
            Command::Chapter { path, process } => Some(if *process {
                AppEvent::ProcessChapter {
                    chapter_path: path.clone(),
                }
            } else {
                AppEvent::CheckChapter {
                    chapter_path: path.clone(),
                }
            }),
            Command::Jimaku {
                title,
                episode,
                anilist_id,
            } => Some(AppEvent::SearchJimaku {
                title: title.clone(),
                anilist_id: *anilist_id,
                episode: *episode,
            }),
            Command::NewProfile { .. } => None,
        }
    }

    pub fn goal(&self) -> Goal {
        match self {
            Command::Ocr { url } => Goal::Regions {
                source_key: url.clone(),
            },
            Command::Lookup { .. } => Goal::Lookup,
            Command::Subtitles { at, .. } => Goal::Subtitles { at: *at },
            Command::Chapter { path, process } => Goal::Chapter {
                chapter_path: path.clone(),
                process: *process,
            },
            Command::Jimaku { .. } => Goal::Jimaku,
            Command::NewProfile { .. } => Goal::Nothing,
        }
    }
}
