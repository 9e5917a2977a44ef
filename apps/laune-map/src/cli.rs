//! Line-oriented stdin driver for the headless client.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use laune_core::domain::{Mood, NewPost, PostId, age_label};
use laune_core::ports::{Clock, SystemClock};

use crate::controller::PostStoreController;
use crate::map::{MapSurface, MarkerBinding};

/// Comments longer than this are cut, matching the browser form.
pub const COMMENT_MAX_CHARS: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "laune", no_binary_name = true, disable_version_flag = true)]
#[command(about = "Share a mood on the map. Posts disappear after 24 hours.", long_about = None)]
struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Pin a mood and a short comment to a coordinate
    Post {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        /// happy, smile, neutral or sad
        mood: Mood,
        nickname: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        comment: Vec<String>,
    },

    /// Show the visible posts
    #[command(visible_alias = "ls")]
    List,

    /// Open or close a marker's info window
    Open { id: String },

    /// Reload posts from the shared document
    Refresh,

    /// Forget the posts cached on this device
    Clear,

    /// Show controller state
    Status,

    /// Leave the console
    #[command(visible_alias = "exit")]
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, clap::Error> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }
        ConsoleLine::try_parse_from(words).map(|parsed| Some(parsed.command))
    }
}

/// Build the post payload, joining the comment words and cutting them to length.
pub fn compose_post(lat: f64, lng: f64, mood: Mood, nickname: String, comment: &[String]) -> NewPost {
    let comment: String = comment.join(" ").chars().take(COMMENT_MAX_CHARS).collect();
    NewPost::new(lat, lng, mood, nickname, comment)
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run_console<S: MapSurface>(
    controller: PostStoreController,
    binding: Arc<Mutex<MarkerBinding<S>>>,
) -> std::io::Result<()> {
    let clock = SystemClock;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("type `help` for commands");

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e.to_string().trim_end());
                continue;
            }
        };

        match command {
            Command::Post {
                lat,
                lng,
                mood,
                nickname,
                comment,
            } => {
                let data = compose_post(lat, lng, mood, nickname, &comment);
                match controller.add_post(data).await {
                    Ok(post) => println!("posted {} {}", post.id, post.mood.icon()),
                    Err(e) => println!("failed to post: {e}"),
                }
            }
            Command::List => {
                let posts = controller.snapshot();
                let now = clock.now_millis();
                if posts.is_empty() {
                    println!("no posts in the last 24 hours");
                }
                for post in posts.iter() {
                    println!(
                        "{} {} {:.4},{:.4} {}: {} ({})",
                        post.id,
                        post.mood.icon(),
                        post.latitude,
                        post.longitude,
                        post.nickname,
                        post.comment,
                        age_label(post.created_at, now),
                    );
                }
            }
            Command::Open { id } => {
                let id = PostId::new(id);
                let opened = binding.lock().await.toggle(&id);
                println!("{id}: {}", if opened { "opened" } else { "closed" });
            }
            Command::Refresh => controller.refresh().await,
            Command::Clear => {
                controller.clear_local().await;
                println!("local posts cleared");
            }
            Command::Status => {
                let status = controller.status().await;
                let last_error = status
                    .last_error
                    .map(|kind| kind.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "phase={:?} loading={} posts={} mode={} last_error={}",
                    status.phase, status.is_loading, status.post_count, status.mode, last_error
                );
            }
            Command::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_post() {
        let command = Command::parse_line("post 35.68 139.76 happy taro good morning tokyo")
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            Command::Post {
                lat: 35.68,
                lng: 139.76,
                mood: Mood::Happy,
                nickname: "taro".into(),
                comment: words("good morning tokyo"),
            }
        );
    }

    #[test]
    fn test_parse_post_with_negative_coordinates() {
        let Some(Command::Post { lat, lng, .. }) =
            Command::parse_line("post -33.86 -151.2 sad kim rainy again").unwrap()
        else {
            panic!("expected post");
        };
        assert_eq!((lat, lng), (-33.86, -151.2));
    }

    #[test]
    fn test_compose_post_truncates_comment() {
        let data = compose_post(
            1.0,
            2.0,
            Mood::Sad,
            "hana".into(),
            &words("this comment is much longer than twenty"),
        );
        assert_eq!(data.comment.chars().count(), COMMENT_MAX_CHARS);
        assert_eq!(data.comment, "this comment is much");
        assert_eq!(data.nickname, "hana");
    }

    #[test]
    fn test_parse_post_errors() {
        let kind = |line: &str| Command::parse_line(line).unwrap_err().kind();

        assert_eq!(kind("post 1 2 happy taro"), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind("post north 2 happy taro hi"), ErrorKind::ValueValidation);
        assert_eq!(kind("post 1 2 angry taro hi"), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse_line("   ").unwrap(), None);
        assert_eq!(Command::parse_line("list").unwrap(), Some(Command::List));
        assert_eq!(Command::parse_line("ls").unwrap(), Some(Command::List));
        assert_eq!(
            Command::parse_line("open 1700000000000").unwrap(),
            Some(Command::Open {
                id: "1700000000000".into()
            })
        );
        assert_eq!(Command::parse_line("exit").unwrap(), Some(Command::Quit));
        assert_eq!(
            Command::parse_line("dance").unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert_eq!(
            Command::parse_line("help").unwrap_err().kind(),
            ErrorKind::DisplayHelp
        );
    }
}
