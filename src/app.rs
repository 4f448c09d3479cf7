use std::sync::Arc;

use tokio::sync::mpsc;

use crate::ai::OllamaClient;
use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::index::FaqIndex;
use crate::models::{
    FaqEntry, FavoriteEntry, GenerationStatus, HistoryEntry, NewFaqEntry, ResolvedAnswer,
};
use crate::resolver::AnswerResolver;
use crate::tui::AppAction;

// Message for a completed background search
pub struct SearchOutcome {
    pub question: String,
    pub result: std::result::Result<ResolvedAnswer, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    Search,
    History,
    Favorites,
    Manage,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 4] = [
        ActiveTab::Search,
        ActiveTab::History,
        ActiveTab::Favorites,
        ActiveTab::Manage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActiveTab::Search => "Search",
            ActiveTab::History => "History",
            ActiveTab::Favorites => "Favorites",
            ActiveTab::Manage => "Manage FAQ",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Question,
    Answer,
}

/// Add/edit form state for the Manage tab.
pub struct FaqForm {
    pub question: String,
    pub answer: String,
    pub field: FormField,
    pub editing: Option<i64>,
}

impl FaqForm {
    fn empty() -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            field: FormField::Question,
            editing: None,
        }
    }

    fn editing(entry: &FaqEntry) -> Self {
        Self {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
            field: FormField::Question,
            editing: Some(entry.id),
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Question => &mut self.question,
            FormField::Answer => &mut self.answer,
        }
    }
}

pub struct App {
    // Data
    pub entries: Vec<FaqEntry>,
    pub history: Vec<HistoryEntry>,
    pub favorites: Vec<FavoriteEntry>,
    pub results: Vec<ResolvedAnswer>,

    // UI State
    pub tab: ActiveTab,
    pub input: String,
    pub selected_result: usize,
    pub selected_history: usize,
    pub selected_favorite: usize,
    pub selected_entry: usize,
    pub form: Option<FaqForm>,
    pub show_help: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,

    // Async state
    pub pending_searches: usize,
    pub generation_status: GenerationStatus,
    search_rx: mpsc::Receiver<SearchOutcome>,
    search_tx: mpsc::Sender<SearchOutcome>,
    probe_rx: mpsc::Receiver<bool>,

    // Services
    pub repository: Arc<Repository>,
    index: Arc<FaqIndex>,
    resolver: Arc<AnswerResolver>,
    history_limit: u32,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Arc::new(Repository::new(&config.db_path).await?);
        let entries = repository.all_faq().await?;

        let index = Arc::new(FaqIndex::open_or_create(
            std::path::Path::new(&config.index_path),
            &entries,
        )?);

        let client = Arc::new(OllamaClient::new(config));
        let resolver = Arc::new(AnswerResolver::new(
            Arc::clone(&repository),
            Arc::clone(&index),
            client.clone(),
            config.relevance_threshold,
        ));

        let history = repository.recent_history(config.history_limit).await?;
        let favorites = repository.list_favorites().await?;

        let (search_tx, search_rx) = mpsc::channel(32);
        let (probe_tx, probe_rx) = mpsc::channel(1);

        // One startup reachability check, purely for the status line.
        tokio::spawn(async move {
            let reachable = client.probe().await;
            let _ = probe_tx.send(reachable).await;
        });

        Ok(Self {
            entries,
            history,
            favorites,
            results: Vec::new(),
            tab: ActiveTab::Search,
            input: String::new(),
            selected_result: 0,
            selected_history: 0,
            selected_favorite: 0,
            selected_entry: 0,
            form: None,
            show_help: false,
            error_message: None,
            status_message: None,
            pending_searches: 0,
            generation_status: GenerationStatus::Checking,
            search_rx,
            search_tx,
            probe_rx,
            repository,
            index,
            resolver,
            history_limit: config.history_limit,
        })
    }

    /// Headless one-shot resolution for the `--ask` flag.
    pub async fn ask_blocking(&self, question: &str) -> Result<ResolvedAnswer> {
        self.resolver.resolve(question).await
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        // Any action clears a stale one-line notice.
        self.status_message = None;

        match action {
            AppAction::Quit => return Ok(true),

            AppAction::NextTab => {
                self.tab = self.tab.next();
            }

            AppAction::PrevTab => {
                self.tab = self.tab.prev();
            }

            AppAction::InputChar(c) => {
                self.input.push(c);
            }

            AppAction::InputBackspace => {
                self.input.pop();
            }

            AppAction::InputClear => {
                self.input.clear();
            }

            AppAction::SubmitQuestion => {
                self.submit_search();
            }

            AppAction::MoveUp => self.move_selection(-1),
            AppAction::MoveDown => self.move_selection(1),

            AppAction::SaveFavorite => {
                self.save_favorite().await?;
            }

            AppAction::DeleteSelected => match self.tab {
                ActiveTab::Favorites => self.delete_selected_favorite().await?,
                ActiveTab::Manage => self.delete_selected_entry().await?,
                _ => {}
            },

            AppAction::StartAdd => {
                if self.tab == ActiveTab::Manage {
                    self.form = Some(FaqForm::empty());
                }
            }

            AppAction::StartEdit => {
                if self.tab == ActiveTab::Manage {
                    if let Some(entry) = self.entries.get(self.selected_entry) {
                        self.form = Some(FaqForm::editing(entry));
                    }
                }
            }

            AppAction::FormChar(c) => {
                if let Some(form) = &mut self.form {
                    form.active_field_mut().push(c);
                }
            }

            AppAction::FormBackspace => {
                if let Some(form) = &mut self.form {
                    form.active_field_mut().pop();
                }
            }

            AppAction::FormNextField => {
                if let Some(form) = &mut self.form {
                    form.field = match form.field {
                        FormField::Question => FormField::Answer,
                        FormField::Answer => FormField::Question,
                    };
                }
            }

            AppAction::FormConfirm => {
                self.save_form().await?;
            }

            AppAction::FormCancel => {
                self.form = None;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::DismissError => {
                self.error_message = None;
            }
        }

        Ok(false)
    }

    /// Spawn one independent background task per submitted question.
    /// Nothing bounds or cancels in-flight searches; results land in
    /// completion order.
    fn submit_search(&mut self) {
        let question = self.input.trim().to_string();
        if question.is_empty() {
            self.status_message = Some("Please enter a question".to_string());
            return;
        }

        self.input.clear();
        self.pending_searches += 1;

        let resolver = Arc::clone(&self.resolver);
        let tx = self.search_tx.clone();

        tokio::spawn(async move {
            let result = resolver
                .resolve(&question)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(SearchOutcome { question, result }).await;
        });
    }

    /// Poll for completed searches (non-blocking), appending each result
    /// as its task finishes.
    pub async fn poll_search_results(&mut self) -> Result<()> {
        while let Ok(outcome) = self.search_rx.try_recv() {
            self.pending_searches = self.pending_searches.saturating_sub(1);
            match outcome.result {
                Ok(resolved) => {
                    self.results.push(resolved);
                    self.selected_result = self.results.len() - 1;
                    self.reload_history().await?;
                }
                Err(e) => {
                    tracing::error!("Search for {:?} failed: {}", outcome.question, e);
                    self.error_message = Some(e);
                }
            }
        }
        Ok(())
    }

    pub fn poll_probe_result(&mut self) {
        if let Ok(reachable) = self.probe_rx.try_recv() {
            self.generation_status = if reachable {
                GenerationStatus::Connected
            } else {
                GenerationStatus::Unreachable
            };
        }
    }

    fn move_selection(&mut self, delta: i64) {
        let (selected, len) = match self.tab {
            ActiveTab::Search => (&mut self.selected_result, self.results.len()),
            ActiveTab::History => (&mut self.selected_history, self.history.len()),
            ActiveTab::Favorites => (&mut self.selected_favorite, self.favorites.len()),
            ActiveTab::Manage => (&mut self.selected_entry, self.entries.len()),
        };
        if len == 0 {
            *selected = 0;
            return;
        }
        let next = (*selected as i64 + delta).clamp(0, len as i64 - 1);
        *selected = next as usize;
    }

    async fn save_favorite(&mut self) -> Result<()> {
        let Some(result) = self.results.get(self.selected_result) else {
            return Ok(());
        };

        match self
            .repository
            .insert_favorite(result.question.clone(), result.answer.clone())
            .await
        {
            Ok(_) => {
                self.favorites = self.repository.list_favorites().await?;
                self.status_message = Some("Saved to favorites".to_string());
            }
            Err(e) => {
                tracing::error!("Failed to save favorite: {}", e);
                self.error_message = Some(format!("Failed to save favorite: {e}"));
            }
        }
        Ok(())
    }

    async fn delete_selected_favorite(&mut self) -> Result<()> {
        let Some(favorite) = self.favorites.get(self.selected_favorite) else {
            return Ok(());
        };
        let id = favorite.id;

        match self.repository.delete_favorite(id).await {
            Ok(()) => {
                self.favorites = self.repository.list_favorites().await?;
                let len = self.favorites.len();
                if len > 0 && self.selected_favorite >= len {
                    self.selected_favorite = len - 1;
                }
                self.status_message = Some("Removed from favorites".to_string());
            }
            Err(e) => {
                tracing::error!("Failed to delete favorite: {}", e);
                self.error_message = Some(format!("Failed to delete favorite: {e}"));
            }
        }
        Ok(())
    }

    async fn delete_selected_entry(&mut self) -> Result<()> {
        let Some(entry) = self.entries.get(self.selected_entry) else {
            return Ok(());
        };
        let id = entry.id;

        if let Err(e) = self.repository.delete_faq(id).await {
            tracing::error!("Failed to delete FAQ entry: {}", e);
            self.error_message = Some(format!("Failed to delete entry: {e}"));
            return Ok(());
        }
        // Keep the index in step with every FAQ mutation.
        if let Err(e) = self.index.remove(id).await {
            tracing::error!("Failed to remove entry from index: {}", e);
            self.error_message = Some(format!("Failed to update index: {e}"));
        }

        self.reload_entries().await?;
        let len = self.entries.len();
        if len > 0 && self.selected_entry >= len {
            self.selected_entry = len - 1;
        }
        Ok(())
    }

    async fn save_form(&mut self) -> Result<()> {
        let Some(form) = &self.form else {
            return Ok(());
        };
        if form.question.trim().is_empty() || form.answer.trim().is_empty() {
            self.status_message = Some("Fill in both question and answer".to_string());
            return Ok(());
        }

        let question = form.question.trim().to_string();
        let answer = form.answer.trim().to_string();
        let editing = form.editing;

        let saved = match editing {
            Some(id) => self
                .repository
                .update_faq(id, question.clone(), answer.clone())
                .await
                .map(|_| id),
            None => {
                self.repository
                    .insert_faq(NewFaqEntry {
                        question: question.clone(),
                        answer: answer.clone(),
                    })
                    .await
            }
        };

        let id = match saved {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to save FAQ entry: {}", e);
                self.error_message = Some(format!("Failed to save entry: {e}"));
                return Ok(());
            }
        };

        if let Err(e) = self
            .index
            .upsert(&FaqEntry {
                id,
                question,
                answer,
            })
            .await
        {
            tracing::error!("Failed to index entry: {}", e);
            self.error_message = Some(format!("Failed to update index: {e}"));
        }

        self.form = None;
        self.reload_entries().await?;
        self.status_message = Some(if editing.is_some() {
            "Entry updated".to_string()
        } else {
            "Entry added".to_string()
        });
        Ok(())
    }

    async fn reload_entries(&mut self) -> Result<()> {
        self.entries = self.repository.all_faq().await?;
        Ok(())
    }

    async fn reload_history(&mut self) -> Result<()> {
        self.history = self.repository.recent_history(self.history_limit).await?;
        Ok(())
    }
}
