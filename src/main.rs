use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use razornav::cli::Args;
use razornav::config::Settings;
use razornav::links::{document_links, link_at, LinkTarget, NavLink};
use razornav::navigation::{LinkCache, NavigationRegistry};

const NAVIGATE_COMMAND: &str = "razornav.navigateTo";
const CLEAR_CACHE_COMMAND: &str = "razornav.clearCache";

struct Document {
    text: String,
    version: i32,
}

struct Backend {
    client: Client,
    workspace_root: RwLock<Option<PathBuf>>,
    settings: RwLock<Settings>,
    documents: RwLock<HashMap<Url, Document>>,
    link_cache: Mutex<LinkCache>,
    navigations: Mutex<NavigationRegistry>,
}

impl Backend {
    fn new(client: Client) -> Backend {
        let defaults = Settings::default();
        Backend {
            client,
            workspace_root: RwLock::new(None),
            settings: RwLock::new(defaults.clone()),
            documents: RwLock::new(HashMap::new()),
            link_cache: Mutex::new(LinkCache::new(defaults.link_cache_capacity)),
            navigations: Mutex::new(NavigationRegistry::new(defaults.navigation_capacity)),
        }
    }

    async fn debug_log(&self, message: String) {
        if self.settings.read().await.debug_logging {
            self.client.log_message(MessageType::LOG, message).await;
        }
    }

    /// Compute the raw navigation links for an open document.
    async fn nav_links(&self, uri: &Url) -> Option<Vec<NavLink>> {
        let path = uri.to_file_path().ok()?;
        let documents = self.documents.read().await;
        let document = documents.get(uri)?;

        let root = self.workspace_root.read().await;
        let workspace_root = match root.as_ref() {
            Some(root) => root.clone(),
            None => path.parent()?.to_path_buf(),
        };

        Some(document_links(&document.text, &path, &workspace_root))
    }

    async fn to_document_link(&self, nav: NavLink) -> DocumentLink {
        let target = match &nav.target {
            LinkTarget::File(path) => Url::from_file_path(path).ok(),
            LinkTarget::FileLine(..) => {
                let id = self.navigations.lock().await.register(nav.target.clone());
                command_uri(&id)
            }
        };

        DocumentLink {
            range: nav.range,
            target,
            tooltip: Some(nav.tooltip),
            data: None,
        }
    }
}

fn command_uri(id: &str) -> Option<Url> {
    let args = serde_json::to_string(&[id]).ok()?;
    Url::parse(&format!(
        "command:{NAVIGATE_COMMAND}?{}",
        urlencoding::encode(&args)
    ))
    .ok()
}

/// The selection to reveal for a link target: the start of the located line,
/// or the start of the file.
fn target_selection(target: &LinkTarget) -> Range {
    let line = target.line().map(|l| l.saturating_sub(1)).unwrap_or(0);
    let position = Position { line, character: 0 };
    Range {
        start: position,
        end: position,
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok());

        if let Some(root) = root {
            match Settings::new(&root) {
                Ok(settings) => {
                    *self.link_cache.lock().await =
                        LinkCache::new(settings.link_cache_capacity);
                    *self.navigations.lock().await =
                        NavigationRegistry::new(settings.navigation_capacity);
                    *self.settings.write().await = settings;
                }
                Err(err) => {
                    self.client
                        .log_message(
                            MessageType::WARNING,
                            format!("razornav settings failed to load; using defaults: {err}"),
                        )
                        .await;
                }
            }
            *self.workspace_root.write().await = Some(root);
        }

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "razornav".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                document_link_provider: Some(DocumentLinkOptions {
                    resolve_provider: Some(false),
                    work_done_progress_options: Default::default(),
                }),
                definition_provider: Some(OneOf::Left(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        NAVIGATE_COMMAND.to_string(),
                        CLEAR_CACHE_COMMAND.to_string(),
                    ],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "razornav ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.documents.write().await.insert(
            doc.uri,
            Document {
                text: doc.text,
                version: doc.version,
            },
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.documents.write().await.insert(
            params.text_document.uri,
            Document {
                text: change.text,
                version: params.text_document.version,
            },
        );
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.write().await.remove(&params.text_document.uri);
        self.link_cache.lock().await.remove(&params.text_document.uri);
    }

    async fn document_link(
        &self,
        params: DocumentLinkParams,
    ) -> Result<Option<Vec<DocumentLink>>> {
        let uri = params.text_document.uri;

        let caching = self.settings.read().await.enable_caching;
        let version = self
            .documents
            .read()
            .await
            .get(&uri)
            .map(|doc| doc.version);

        if caching {
            if let Some(version) = version {
                if let Some(cached) = self.link_cache.lock().await.get(&uri, version) {
                    self.debug_log(format!("cached links for {uri}")).await;
                    return Ok(Some(cached.to_vec()));
                }
            }
        }

        let Some(nav_links) = self.nav_links(&uri).await else {
            return Ok(None);
        };
        self.debug_log(format!("{} links in {uri}", nav_links.len()))
            .await;

        let mut links = Vec::with_capacity(nav_links.len());
        for nav in nav_links {
            links.push(self.to_document_link(nav).await);
        }

        if caching {
            if let Some(version) = version {
                self.link_cache
                    .lock()
                    .await
                    .insert(uri, version, links.clone());
            }
        }

        Ok(Some(links))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(links) = self.nav_links(&uri).await else {
            return Ok(None);
        };
        let Some(link) = link_at(&links, position) else {
            return Ok(None);
        };
        let Ok(target_uri) = Url::from_file_path(link.target.path()) else {
            return Ok(None);
        };

        Ok(Some(GotoDefinitionResponse::Scalar(Location {
            uri: target_uri,
            range: target_selection(&link.target),
        })))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        match params.command.as_str() {
            NAVIGATE_COMMAND => {
                let Some(id) = params.arguments.first().and_then(Value::as_str) else {
                    return Ok(None);
                };
                let target = self.navigations.lock().await.get(id).cloned();
                let Some(target) = target else {
                    self.debug_log(format!("stale navigation id {id}")).await;
                    return Ok(None);
                };
                let Ok(uri) = Url::from_file_path(target.path()) else {
                    return Ok(None);
                };

                let _ = self
                    .client
                    .show_document(ShowDocumentParams {
                        uri,
                        external: Some(false),
                        take_focus: Some(true),
                        selection: Some(target_selection(&target)),
                    })
                    .await;
                Ok(None)
            }
            CLEAR_CACHE_COMMAND => {
                self.link_cache.lock().await.clear();
                self.debug_log("link cache cleared".to_string()).await;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() {
    let _args = Args::parse();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
