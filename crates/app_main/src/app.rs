//! Line-oriented front end
//!
//! Reads one command per line, turns it into an intent or an open request
//! and prints the resulting state.

use anyhow::Result;
use app_core::{AppError, AppState, Intent, MediaKind, Navigator, OpenOutcome, SwipeDirection, View};
use app_remote::{GooglePhotosClient, RemoteLibrary};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const TOKEN_ENV: &str = "PHOTO_SWIPER_ACCESS_TOKEN";

const PROCESSING_NOTICE_AFTER: Duration = Duration::from_millis(200);

const HELP: &str = "\
Start:   demo <id> | open [path] | remote
Grid:    list | select <n> | album <title> | albums | back
Swipe:   show | keep | delete | swipe left|right | move <album-id> | again
         rename <name> | fav | album <title> | albums | back
Always:  direction left|right | help | quit";

enum Flow {
    Continue,
    Quit,
}

struct App {
    nav: Navigator,
    input: Lines<BufReader<Stdin>>,
}

pub async fn run(state: AppState) -> Result<()> {
    let mut app = App {
        nav: Navigator::new(state),
        input: BufReader::new(tokio::io::stdin()).lines(),
    };

    println!("{}", HELP);
    app.render();

    loop {
        prompt(app.nav.view())?;
        let Some(line) = app.input.next_line().await? else {
            break;
        };

        match app.handle(line.trim()).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => app.render(),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Command failed: {}", e);
                println!("! {}", e.user_message());
            }
            Err(e) => {
                tracing::error!("Command failed: {}", e);
                println!("! {}", e.user_message());
            }
        }
    }

    app.nav.shutdown().await;
    tracing::info!("PhotoSwiper exiting");
    Ok(())
}

fn prompt(view: View) -> std::io::Result<()> {
    print!("{:?}> ", view);
    std::io::stdout().flush()
}

impl App {
    async fn handle(&mut self, line: &str) -> Result<Flow, AppError> {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let intent = match command {
            "" => return Ok(Flow::Continue),
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" | "?" => {
                println!("{}", HELP);
                return Ok(Flow::Continue);
            }
            "demo" => {
                self.nav.open_demo(arg).await?;
                return Ok(Flow::Continue);
            }
            "open" => {
                let root = (!arg.is_empty()).then(|| PathBuf::from(arg));
                let outcome = self.nav.open_local(root).await?;
                report(outcome);
                return Ok(Flow::Continue);
            }
            "remote" => {
                let library = self.remote_library().await?;
                let outcome = self.nav.connect_remote(library).await?;
                report(outcome);
                return Ok(Flow::Continue);
            }
            "list" => {
                self.print_grid();
                return Ok(Flow::Continue);
            }
            "albums" => {
                self.print_albums();
                return Ok(Flow::Continue);
            }
            "show" => return Ok(Flow::Continue),
            "select" => Intent::SelectPhoto(parse_index(arg)?),
            "keep" => Intent::Keep,
            "delete" => Intent::Delete,
            "swipe" => Intent::Swipe(parse_direction(arg)?),
            "move" => Intent::MoveToAlbum(arg.to_string()),
            "again" => Intent::RepeatLastMove,
            "rename" => Intent::Rename(arg.to_string()),
            "fav" => Intent::ToggleFavorite,
            "album" => Intent::CreateAlbum(arg.to_string()),
            "direction" => Intent::SetDeleteDirection(parse_direction(arg)?),
            "back" => Intent::Back,
            other => {
                println!("Unknown command: {} (try \"help\")", other);
                return Ok(Flow::Continue);
            }
        };

        if !intent.is_mutation() {
            self.nav.dispatch(intent).await?;
            return Ok(Flow::Continue);
        }

        // Announce slow store calls while the dispatch is still pending
        let coordinator = self.nav.coordinator();
        let notice = tokio::spawn(async move {
            tokio::time::sleep(PROCESSING_NOTICE_AFTER).await;
            if coordinator.is_busy() {
                println!("  (processing...)");
            }
        });
        let result = self.nav.dispatch(intent).await;
        notice.abort();
        result?;
        Ok(Flow::Continue)
    }

    /// Build a client from the token in the environment, or ask for one.
    /// An empty answer cancels the connection.
    async fn remote_library(&mut self) -> Result<Option<Arc<dyn RemoteLibrary>>, AppError> {
        let token = match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => token,
            _ => {
                print!("Access token (empty to cancel): ");
                std::io::stdout().flush()?;
                self.input.next_line().await?.unwrap_or_default()
            }
        };

        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let remote = &self.nav.state().config().remote;
        let client = GooglePhotosClient::new(remote.api_url.clone(), token)
            .with_album_page_size(remote.album_page_size);
        let library: Arc<dyn RemoteLibrary> = Arc::new(client);
        Ok(Some(library))
    }

    fn render(&self) {
        match self.nav.view() {
            View::Start => {
                println!("Demo collections:");
                for demo in self.nav.demo_collections() {
                    println!("  {:<12} {} ({} photos)", demo.id, demo.name, demo.photo_count);
                }
                let delete = self.nav.delete_direction();
                println!("Swipe {} to delete, {} to keep", delete.as_str(), delete.opposite().as_str());
            }
            View::Grid => {
                if let Some(collection) = self.nav.collection() {
                    println!(
                        "{}: {} photos, {} albums (\"list\" to show, \"select <n>\" to start)",
                        collection.name,
                        collection.len(),
                        collection.albums().len()
                    );
                }
                if let Some(index) = self.nav.last_viewed_index() {
                    println!("Last viewed: #{}", index);
                }
            }
            View::Swipe => self.print_current(),
        }
    }

    fn print_current(&self) {
        let total = self.nav.collection().map_or(0, |c| c.len());
        match self.nav.current_photo() {
            Some(photo) => {
                let star = if photo.is_favorite { " *" } else { "" };
                let kind = match photo.kind {
                    MediaKind::Image => "image",
                    MediaKind::Video => "video",
                };
                println!("[{}/{}] {}{} ({})", self.nav.cursor() + 1, total, photo.display_path(), star, kind);
                println!("  {}", photo.url);
            }
            None => println!("All {} photos reviewed. \"back\" to leave.", total),
        }

        if let Some(message) = self.nav.feedback() {
            println!("  {}", message);
        }
    }

    fn print_grid(&self) {
        let Some(collection) = self.nav.collection() else {
            println!("No collection loaded");
            return;
        };
        for (index, photo) in collection.photos().iter().enumerate() {
            let star = if photo.is_favorite { " *" } else { "" };
            println!("{:>4}  {}{}", index, photo.display_path(), star);
        }
    }

    fn print_albums(&self) {
        let Some(collection) = self.nav.collection() else {
            println!("No collection loaded");
            return;
        };
        if collection.albums().is_empty() {
            println!("No albums");
        }
        for album in collection.albums() {
            let last = if self.nav.last_used_album() == Some(album.id.as_str()) { " (last)" } else { "" };
            println!("  {:<24} {}{}", album.id, album.title, last);
        }
    }
}

fn report(outcome: OpenOutcome) {
    if outcome == OpenOutcome::Cancelled {
        println!("Cancelled");
    }
}

fn parse_index(arg: &str) -> Result<usize, AppError> {
    arg.parse()
        .map_err(|_| AppError::InvalidName(format!("not a photo number: {}", arg)))
}

fn parse_direction(arg: &str) -> Result<SwipeDirection, AppError> {
    arg.parse().map_err(AppError::InvalidName)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_index("3").unwrap(), 3);
        assert!(parse_index("x").is_err());
        assert_eq!(parse_direction("right").unwrap(), SwipeDirection::Right);
        assert!(matches!(parse_direction("up"), Err(AppError::InvalidName(_))));
    }
}
