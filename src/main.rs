use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use blog_console::commands;
use blog_console::config::ConsoleConfig;
use blog_console::logging::init_logger;
use blog_console::models::{CreateCommentRequest, PostDetailDto, SitePatch, SocialLinkDraft, SocialLinkPatch};
use blog_console::services::{
    category_title, resolve_route, BlogApiClient, EventBus, FileStorage, KeyValueStorage,
    SettingsStore, TokenStore,
};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser)]
#[command(name = "blog-console", version, about = "Manage a personal blog from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Site title, subtitle and avatar
    #[command(subcommand)]
    Settings(SettingsAction),
    /// Sidebar social links
    #[command(subcommand)]
    Social(SocialAction),
    /// Log in to the blog API and keep the session token
    Login { username: String, password: String },
    /// Forget the session token
    Logout,
    /// Print the sidebar for a path
    Nav {
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Show which page a path resolves to
    Route { path: String },
    /// Blog categories
    #[command(subcommand)]
    Categories(CategoryAction),
    /// List posts in a category
    Posts { category: String },
    /// Single posts
    #[command(subcommand)]
    Post(PostAction),
    /// Show a static page
    Page { slug: String },
    /// Post comments
    #[command(subcommand)]
    Comments(CommentAction),
    /// Like (or dislike) a post
    Like {
        post_id: i64,
        #[arg(long)]
        dislike: bool,
    },
    /// Show like and dislike counts of a post
    Likes { slug: String },
    /// Upload media and print a markdown snippet embedding it
    Upload { kind: MediaKind, file: PathBuf },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Site {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        /// Empty string restores the bundled avatar
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Replace all settings with a JSON document
    Import { file: PathBuf },
    Reset,
    UploadAvatar { file: PathBuf },
}

#[derive(Subcommand)]
enum SocialAction {
    List,
    Add {
        #[arg(long)]
        label: String,
        #[arg(long)]
        href: String,
        #[arg(long, default_value = "")]
        icon_url: String,
    },
    Remove { id: String },
    Update {
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        href: Option<String>,
        #[arg(long)]
        icon_url: Option<String>,
    },
    UploadIcon { id: String, file: PathBuf },
}

#[derive(Subcommand)]
enum CategoryAction {
    List,
    Create { name: String, slug: String },
    Update { id: i64, name: String, slug: String },
}

#[derive(Subcommand)]
enum PostAction {
    Show { slug: String },
    /// Create a post whose content is read from a markdown file
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "blog")]
        category: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Create a post by uploading a markdown file
    CreateMd {
        #[arg(long, default_value = "blog")]
        category: String,
        file: PathBuf,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    UpdateMd {
        id: i64,
        file: PathBuf,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum CommentAction {
    List { post_id: i64 },
    Add {
        post_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        content: String,
    },
    Delete {
        comment_id: i64,
        #[arg(long)]
        email: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaKind {
    Image,
    Video,
}

// ============================================================================
// Application State
// ============================================================================

struct Console {
    store: SettingsStore,
    tokens: TokenStore,
    client: BlogApiClient,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

async fn run(console: &Console, command: Command) -> Result<(), String> {
    let Console { store, tokens, client } = console;

    match command {
        Command::Settings(action) => match action {
            SettingsAction::Show => println!("{}", commands::show_settings(store)?),
            SettingsAction::Site { title, subtitle, avatar_url } => {
                commands::update_site(store, SitePatch { title, subtitle, avatar_url })?;
            }
            SettingsAction::Import { file } => {
                commands::import_settings(store, &read_file(&file)?)?;
            }
            SettingsAction::Reset => commands::reset_settings(store)?,
            SettingsAction::UploadAvatar { file } => {
                let url = commands::upload_avatar(client, store, &file).await?;
                println!("{url}");
            }
        },

        Command::Social(action) => match action {
            SocialAction::List => print_json(&store.get_settings().social)?,
            SocialAction::Add { label, href, icon_url } => {
                let id = commands::add_social(store, SocialLinkDraft { label, href, icon_url })?;
                println!("{id}");
            }
            SocialAction::Remove { id } => {
                if !commands::remove_social(store, &id)? {
                    log::warn!("No social link with id '{}'", id);
                }
            }
            SocialAction::Update { id, label, href, icon_url } => {
                commands::update_social(store, &id, SocialLinkPatch { label, href, icon_url })?;
            }
            SocialAction::UploadIcon { id, file } => {
                let url = commands::upload_social_icon(client, store, &id, &file).await?;
                println!("{url}");
            }
        },

        Command::Login { username, password } => {
            commands::login(client, tokens, &username, &password).await?;
        }
        Command::Logout => commands::logout(tokens)?,

        Command::Nav { path } => print_json(&commands::navigation(client, tokens, &path).await)?,
        Command::Route { path } => print_json(&resolve_route(&path, tokens.is_logged_in()))?,

        Command::Categories(action) => match action {
            CategoryAction::List => {
                let categories = client.get_all_categories().await.map_err(|e| e.to_string())?;
                print_json(&categories)?;
            }
            CategoryAction::Create { name, slug } => {
                if name.trim().is_empty() || slug.trim().is_empty() {
                    return Err("Category name and slug are required".to_string());
                }
                let category = client
                    .create_category(&name, &slug)
                    .await
                    .map_err(|e| format!("Failed to create category: {e}"))?;
                print_json(&category)?;
            }
            CategoryAction::Update { id, name, slug } => {
                let category = client
                    .update_category(id, &name, &slug)
                    .await
                    .map_err(|e| format!("Failed to update category: {e}"))?;
                print_json(&category)?;
            }
        },

        Command::Posts { category } => {
            println!("# {}", category_title(&category));
            let posts = client
                .get_posts_by_category(&category)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&posts)?;
        }

        Command::Post(action) => match action {
            PostAction::Show { slug } => {
                let post = client.get_post_detail(&slug).await.map_err(|e| e.to_string())?;
                print_json(&post)?;
            }
            PostAction::Create { title, slug, category, file } => {
                let body = commands::new_post_body(&title, &slug, &read_file(&file)?)?;
                let post = client
                    .create_post(&body, &category)
                    .await
                    .map_err(|e| format!("Failed to create post: {e}"))?;
                print_json(&post)?;
            }
            PostAction::CreateMd { category, file } => {
                let post = client
                    .create_post_from_md(&file, &category)
                    .await
                    .map_err(|e| format!("Failed to create post: {e}"))?;
                print_json(&post)?;
            }
            PostAction::Update { id, title, slug, category, file } => {
                let content = match file {
                    Some(path) => Some(read_file(&path)?),
                    None => None,
                };
                let body = PostDetailDto {
                    title,
                    slug,
                    content,
                    ..Default::default()
                };
                let post = client
                    .update_post(id, &body, category.as_deref())
                    .await
                    .map_err(|e| format!("Failed to update post: {e}"))?;
                print_json(&post)?;
            }
            PostAction::UpdateMd { id, file, category } => {
                let post = client
                    .update_post_from_md(id, &file, category.as_deref())
                    .await
                    .map_err(|e| format!("Failed to update post: {e}"))?;
                print_json(&post)?;
            }
        },

        Command::Page { slug } => {
            let page = client.get_page_by_slug(&slug).await.map_err(|e| e.to_string())?;
            print_json(&page)?;
        }

        Command::Comments(action) => match action {
            CommentAction::List { post_id } => {
                let comments = client.get_comments(post_id).await.map_err(|e| e.to_string())?;
                print_json(&comments)?;
            }
            CommentAction::Add { post_id, name, email, content } => {
                let comment = client
                    .add_comment(post_id, &CreateCommentRequest { name, email, content })
                    .await
                    .map_err(|e| format!("Failed to add comment: {e}"))?;
                print_json(&comment)?;
            }
            CommentAction::Delete { comment_id, email } => {
                let comment = client
                    .delete_comment(comment_id, &email)
                    .await
                    .map_err(|e| format!("Failed to delete comment: {e}"))?;
                print_json(&comment)?;
            }
        },

        Command::Like { post_id, dislike } => {
            let counts = client.post_like(post_id, !dislike).await.map_err(|e| e.to_string())?;
            print_json(&counts)?;
        }
        Command::Likes { slug } => {
            let counts = client
                .get_like_and_dislike_count(&slug)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&counts)?;
        }

        Command::Upload { kind, file } => {
            let snippet = match kind {
                MediaKind::Image => commands::image_markdown(
                    &client.upload_image(&file).await.map_err(|e| format!("Image upload failed: {e}"))?,
                ),
                MediaKind::Video => commands::video_markdown(
                    &client.upload_video(&file).await.map_err(|e| format!("Video upload failed: {e}"))?,
                ),
            };
            print!("{snippet}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConsoleConfig::from_env()?;

    let event_bus = EventBus::new();
    if let Err(e) = init_logger(&config.log_dir, event_bus.clone(), config.log_level) {
        eprintln!("Failed to initialize logger: {e}");
    }
    log::debug!("Using data directory {}", config.data_dir.display());

    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(&config.data_dir));
    let store = SettingsStore::new(Arc::clone(&storage), event_bus);
    let tokens = TokenStore::new(storage);
    let client = BlogApiClient::new(&config.api_base_url, tokens.clone())?;

    let _settings_watch = store.subscribe(|| log::info!("Site settings updated"));

    let console = Console { store, tokens, client };
    if let Err(e) = run(&console, cli.command).await {
        log::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    log::logger().flush();
    Ok(())
}
