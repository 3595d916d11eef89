//! Dashboard: the catalogue, the user's favorites and the list filter

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::state::{LoadTicket, ScreenState, ScreenTasks};
use crate::error::Result;
use crate::model::{Animal, DisplayState, FavoriteSet, UserProfile};
use crate::operations::Operations;

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub user: UserProfile,
    pub animals: Vec<Animal>,
    pub favorites: FavoriteSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOption {
    Favorites,
    Mammal,
    Bird,
    Reptile,
    Amphibian,
    Fish,
    Endangered,
    Endemic,
}

impl FilterOption {
    pub const ALL: [FilterOption; 8] = [
        FilterOption::Favorites,
        FilterOption::Mammal,
        FilterOption::Bird,
        FilterOption::Reptile,
        FilterOption::Amphibian,
        FilterOption::Fish,
        FilterOption::Endangered,
        FilterOption::Endemic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterOption::Favorites => "My favorites",
            FilterOption::Mammal => "Mammals",
            FilterOption::Bird => "Birds",
            FilterOption::Reptile => "Reptiles",
            FilterOption::Amphibian => "Amphibians",
            FilterOption::Fish => "Fish",
            FilterOption::Endangered => "Endangered",
            FilterOption::Endemic => "Endemic",
        }
    }

    fn matches(self, animal: &Animal, favorites: &FavoriteSet) -> bool {
        let category = |name: &str| animal.category.eq_ignore_ascii_case(name);
        match self {
            FilterOption::Favorites => favorites.contains(&animal.id),
            FilterOption::Mammal => category("mammal"),
            FilterOption::Bird => category("bird"),
            FilterOption::Reptile => category("reptile"),
            FilterOption::Amphibian => category("amphibian"),
            FilterOption::Fish => category("fish"),
            FilterOption::Endangered => matches!(animal.conservation_status.as_str(), "CR" | "EN" | "VU"),
            FilterOption::Endemic => animal.endemic_status.to_lowercase().contains("endemic"),
        }
    }
}

/// Search text plus selected options. An animal passes when it matches any
/// selected option (or none are selected) and its common or scientific name
/// contains the query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardFilter {
    pub query: String,
    pub selected: Vec<FilterOption>,
}

impl DashboardFilter {
    pub fn toggle(&mut self, option: FilterOption) {
        match self.selected.iter().position(|o| *o == option) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(option),
        }
    }

    pub fn is_selected(&self, option: FilterOption) -> bool {
        self.selected.contains(&option)
    }

    pub fn apply<'a>(&self, animals: &'a [Animal], favorites: &FavoriteSet) -> Vec<&'a Animal> {
        let query = self.query.trim().to_lowercase();
        animals
            .iter()
            .filter(|animal| {
                self.selected.is_empty() || self.selected.iter().any(|option| option.matches(animal, favorites))
            })
            .filter(|animal| {
                query.is_empty()
                    || animal.name.to_lowercase().contains(&query)
                    || animal.scientific_name.to_lowercase().contains(&query)
            })
            .collect()
    }
}

/// Favorite change already shown on screen, awaiting the remote write
#[derive(Debug)]
struct PendingToggle {
    ticket: LoadTicket,
    uid: String,
    animal_id: String,
    was_favorite: bool,
}

struct Inner {
    state: ScreenState<Dashboard>,
    ops: Operations,
    /// Favorite writes finished so far
    committed: watch::Sender<usize>,
}

impl Inner {
    async fn fetch(&self) -> Result<Dashboard> {
        let user = self.ops.current_user().await?;
        let (animals, favorite_ids) =
            tokio::try_join!(self.ops.all_animals(), self.ops.favorite_ids(&user.uid))?;
        Ok(Dashboard {
            user,
            animals,
            favorites: favorite_ids.into_iter().collect(),
        })
    }

    async fn load(&self, ticket: LoadTicket) {
        let state = match self.fetch().await {
            Ok(dashboard) => {
                tracing::info!(
                    animals = dashboard.animals.len(),
                    favorites = dashboard.favorites.len(),
                    "Dashboard loaded"
                );
                DisplayState::Success(dashboard)
            }
            Err(e) => {
                tracing::error!(error = %e, "Dashboard load failed");
                DisplayState::Error(e.user_message("Failed to load animals"))
            }
        };
        self.state.finish(ticket, state);
    }

    /// Flip the membership on screen. `None` when nothing is loaded.
    fn apply_optimistic(&self, animal_id: &str) -> Option<PendingToggle> {
        let ticket = self.state.ticket();
        let mut pending = None;
        self.state.modify(ticket, |dashboard| {
            let was_favorite = dashboard.favorites.contains(animal_id);
            dashboard.favorites = dashboard.favorites.with_membership(animal_id, !was_favorite);
            pending = Some(PendingToggle {
                ticket,
                uid: dashboard.user.uid.clone(),
                animal_id: animal_id.to_string(),
                was_favorite,
            });
        });
        if pending.is_none() {
            tracing::debug!(animal_id, "Ignoring favorite toggle outside a loaded dashboard");
        }
        pending
    }

    async fn commit_favorite(&self, pending: PendingToggle) {
        let result = self
            .ops
            .toggle_favorite(&pending.uid, &pending.animal_id, pending.was_favorite)
            .await;

        if let Err(e) = result {
            let restored = self.state.modify(pending.ticket, |dashboard| {
                dashboard.favorites = dashboard
                    .favorites
                    .with_membership(&pending.animal_id, pending.was_favorite);
            });
            if restored {
                tracing::warn!(animal_id = %pending.animal_id, error = %e, "Favorite update failed, rolled back");
            } else {
                tracing::warn!(animal_id = %pending.animal_id, error = %e, "Favorite update failed after a reload, keeping reload");
            }
        }
        self.committed.send_modify(|count| *count += 1);
    }

    /// Apply favorite writes one at a time, in the order they were toggled
    async fn run_writer(&self, mut writes: mpsc::UnboundedReceiver<PendingToggle>) {
        while let Some(pending) = writes.recv().await {
            self.commit_favorite(pending).await;
        }
        tracing::debug!("Favorite writer stopped");
    }
}

pub struct DashboardController {
    inner: Arc<Inner>,
    tasks: ScreenTasks,
    writes: mpsc::UnboundedSender<PendingToggle>,
}

impl DashboardController {
    /// Create the controller and start the first load
    pub fn new(ops: Operations) -> Self {
        let (writes, queue) = mpsc::unbounded_channel();
        let (committed, _) = watch::channel(0);
        let controller = Self {
            inner: Arc::new(Inner {
                state: ScreenState::new(),
                ops,
                committed,
            }),
            tasks: ScreenTasks::new(),
            writes,
        };
        let writer = controller.inner.clone();
        controller.tasks.spawn(async move { writer.run_writer(queue).await });
        controller.retry();
        controller
    }

    pub fn state(&self) -> DisplayState<Dashboard> {
        self.inner.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState<Dashboard>> {
        self.inner.state.subscribe()
    }

    pub fn retry(&self) {
        let ticket = self.inner.state.begin_load();
        let inner = self.inner.clone();
        self.tasks.spawn(async move { inner.load(ticket).await });
    }

    /// Load in place and wait for the result
    pub async fn refresh(&self) {
        let ticket = self.inner.state.begin_load();
        self.inner.load(ticket).await;
    }

    /// Optimistically flip `animal_id`; a failed write restores it
    pub fn toggle_favorite(&self, animal_id: &str) {
        let Some(pending) = self.inner.apply_optimistic(animal_id) else {
            return;
        };
        if let Err(e) = self.writes.send(pending) {
            tracing::warn!(animal_id = %e.0.animal_id, "Favorite writer is gone, change not saved");
        }
    }
}
