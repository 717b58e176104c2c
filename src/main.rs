use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};

use ayahhub::api::{resolve_base_url, ApiClient};
use ayahhub::config::{Config, ConfigStore, Environment};
use ayahhub::logging::init_tracing;
use ayahhub::preferences::{FileBackend, MemoryBackend, PreferenceBackend, PreferenceStore};
use ayahhub::proxy::{Forwarder, ProxyEvent, ProxyServer};
use ayahhub::view::navigation::{parse_surah_number, parse_verse_number};
use ayahhub::view::render::{
    render_languages, render_search, render_surah, render_surah_list, render_verse,
};
use ayahhub::view::{
    ContentQuery, FetchStatus, Layout, PageController, PageState, RevelationFilter,
    SearchController, SurahFilter, SurahListQuery, SurahQuery, VerseQuery,
};

#[derive(Parser)]
#[command(name = "ayahhub", version, about = "Read the Quran from the terminal")]
struct Cli {
    /// Path to config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Send requests through the local proxy
    #[arg(long, global = true)]
    dev: bool,

    /// Translation language for this invocation only (not persisted)
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the local forwarding proxy
    Serve {
        /// Override proxy.bind_addr
        #[arg(long)]
        bind: Option<String>,
    },
    /// List surahs
    Surahs {
        /// all, meccan or medinan
        #[arg(long, default_value = "all")]
        filter: RevelationFilter,
        /// Match by name, translation or number
        #[arg(long)]
        query: Option<String>,
    },
    /// Show a surah with all its verses
    Surah {
        #[arg(value_parser = parse_surah_number)]
        number: u16,
    },
    /// Show a single verse with its recitations
    Verse {
        #[arg(value_parser = parse_surah_number)]
        surah: u16,
        #[arg(value_parser = parse_verse_number)]
        verse: u32,
    },
    /// Full-text search
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// List available translation languages
    Languages,
    /// Show or change the saved translation language
    Lang { code: Option<String> },
    /// Handle one serverless proxy event read as JSON from stdin
    ProxyEvent,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    });

    let path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)?.with_env_overrides();
    if cli.dev {
        config.api.environment = Environment::Development;
    }
    let store = ConfigStore::new(config, path);
    tracing::debug!(path = %store.path().display(), "Configuration loaded");

    match cli.command {
        Command::Serve { bind } => serve(store.get(), bind).await,
        Command::ProxyEvent => proxy_event(store.get()).await,
        Command::Lang { code } => lang(store.get(), code).await,
        Command::Surahs { filter, query } => {
            App::new(store.get(), cli.lang.as_deref())?
                .surahs(filter, query)
                .await
        }
        Command::Surah { number } => App::new(store.get(), cli.lang.as_deref())?.surah(number).await,
        Command::Verse { surah, verse } => {
            App::new(store.get(), cli.lang.as_deref())?
                .verse(surah, verse)
                .await
        }
        Command::Search { query } => {
            App::new(store.get(), cli.lang.as_deref())?
                .search(&query.join(" "))
                .await
        }
        Command::Languages => App::new(store.get(), cli.lang.as_deref())?.languages().await,
    }
}

async fn serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.proxy.bind_addr = bind;
    }

    let mut server = ProxyServer::new(&config.proxy)?;
    let addr = server.try_bind().await.map_err(|e| anyhow::anyhow!(e))?;
    println!("Proxy listening on http://{}{}", addr, config.proxy.prefix);

    server.run().await.map_err(|e| anyhow::anyhow!(e))
}

async fn proxy_event(config: Config) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read event from stdin")?;
    let event: ProxyEvent = serde_json::from_str(&input).context("Invalid proxy event")?;

    let forwarder = Forwarder::new(&config.proxy)?;
    let reply = forwarder.forward(&event).await;
    println!("{}", serde_json::to_string_pretty(&reply.to_event_json())?);
    Ok(())
}

async fn lang(config: Config, code: Option<String>) -> Result<()> {
    let api = ApiClient::from_config(&config.api)?;
    let backend: Arc<dyn PreferenceBackend> = Arc::new(FileBackend::new(config.preferences_path()));
    let preferences = PreferenceStore::open(backend, &config.api.default_language);

    let languages = preferences.ensure_catalog(&api).await;
    if let Some(code) = code {
        if !languages.iter().any(|l| l.code == code) {
            bail!("Unknown language '{}'. Run `ayahhub languages` to list them.", code);
        }
        preferences.set_language(&code)?;
    }

    let current = preferences.current_language();
    println!("{} ({}) {}", current.code, current.name, current.native_name);
    Ok(())
}

/// Wiring shared by the content commands.
struct App {
    config: Config,
    api: Arc<ApiClient>,
    preferences: Arc<PreferenceStore>,
}

impl App {
    fn new(config: Config, lang_override: Option<&str>) -> Result<Self> {
        let api = Arc::new(ApiClient::from_config(&config.api)?);
        tracing::debug!(
            base_url = resolve_base_url(&config.api),
            environment = config.api.environment.as_str(),
            "API client ready"
        );

        let backend: Arc<dyn PreferenceBackend> = match lang_override {
            Some(code) => Arc::new(MemoryBackend::with_language(code)),
            None => Arc::new(FileBackend::new(config.preferences_path())),
        };
        let preferences = Arc::new(PreferenceStore::open(backend, &config.api.default_language));

        Ok(Self {
            config,
            api,
            preferences,
        })
    }

    async fn surahs(&self, revelation: RevelationFilter, query: Option<String>) -> Result<()> {
        let list = self.load(SurahListQuery).await?;
        let filter = SurahFilter {
            text: query.unwrap_or_default(),
            revelation,
        };
        println!("{}", render_surah_list(&filter.apply(&list.surahs)));
        Ok(())
    }

    async fn surah(&self, number: u16) -> Result<()> {
        let detail = self.load(SurahQuery { surah: number }).await?;
        println!("{}", render_surah(&detail, self.layout().await));
        Ok(())
    }

    async fn verse(&self, surah: u16, verse: u32) -> Result<()> {
        let detail = self.load(VerseQuery { surah, verse }).await?;
        println!("{}", render_verse(&detail, self.layout().await));
        Ok(())
    }

    async fn search(&self, text: &str) -> Result<()> {
        let page = Arc::new(PageController::new(self.api.clone(), self.preferences.clone()));
        let search = SearchController::from_config(page.clone(), &self.config.view);
        if !search.submit(text).await {
            bail!(
                "Search needs at least {} characters",
                self.config.view.min_search_chars
            );
        }
        let results = settle(&*page, page.state()).await?;
        println!("{}", render_search(&results, text.trim(), self.layout().await));
        Ok(())
    }

    async fn languages(&self) -> Result<()> {
        let languages = self.preferences.ensure_catalog(self.api.as_ref()).await;
        println!("{}", render_languages(languages, &self.preferences.language()));
        Ok(())
    }

    async fn load<Q: ContentQuery>(&self, query: Q) -> Result<Q::Output> {
        let page = PageController::new(self.api.clone(), self.preferences.clone());
        let state = page.load(query).await;
        settle(&page, state).await
    }

    async fn layout(&self) -> Layout {
        self.preferences.ensure_catalog(self.api.as_ref()).await;
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.parse().ok())
            .unwrap_or(80);
        Layout::new(width, self.preferences.current_language().direction)
    }
}

/// Resolve a settled page, offering a retry on failure when interactive.
async fn settle<Q: ContentQuery>(
    page: &PageController<Q>,
    mut state: PageState<Q::Output>,
) -> Result<Q::Output> {
    loop {
        match state.status {
            FetchStatus::Loaded(data) => return Ok(data),
            FetchStatus::Failed(message) => {
                if !prompt_retry(&message)? {
                    bail!(message);
                }
                state = match page.retry().await {
                    Some(state) => state,
                    None => bail!(message),
                };
            }
            FetchStatus::Idle | FetchStatus::Loading { .. } => bail!("Request did not complete"),
        }
    }
}

fn prompt_retry(message: &str) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }

    eprint!("{}. Retry? [y/N] ", message);
    io::stderr().flush()?;
    let mut answer = String::new();
    stdin.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
