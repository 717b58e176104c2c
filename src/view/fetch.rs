//! Load state machine shared by every content page.
//!
//! Each request carries a generation number. A settle is applied only when
//! its generation is the latest one started for the page, so an earlier
//! request that finishes late can never overwrite a newer one.

use std::marker::PhantomData;

use crate::view::mvi::{Intent, Reducer, UiState};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus<T> {
    /// Nothing requested yet.
    Idle,
    /// Request in flight. `stale` is the last data shown, if any.
    Loading { stale: Option<T> },
    Loaded(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageState<T> {
    /// Generation of the most recently started request.
    pub generation: u64,
    pub status: FetchStatus<T>,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            status: FetchStatus::Idle,
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> UiState for PageState<T> {}

impl<T> PageState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading { .. })
    }

    /// Authoritative data; `None` while loading or after a failure.
    pub fn data(&self) -> Option<&T> {
        match &self.status {
            FetchStatus::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn into_visible(self) -> Option<T> {
        match self.status {
            FetchStatus::Loaded(data) => Some(data),
            FetchStatus::Loading { stale } => stale,
            FetchStatus::Idle | FetchStatus::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FetchIntent<T> {
    Started { generation: u64 },
    Succeeded { generation: u64, data: T },
    Failed { generation: u64, message: String },
}

impl<T: Send + 'static> Intent for FetchIntent<T> {}

pub struct FetchReducer<T>(PhantomData<fn() -> T>);

impl<T: Clone + PartialEq + Send + 'static> Reducer for FetchReducer<T> {
    type State = PageState<T>;
    type Intent = FetchIntent<T>;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FetchIntent::Started { generation } if generation > state.generation => PageState {
                generation,
                status: FetchStatus::Loading {
                    stale: state.into_visible(),
                },
            },
            FetchIntent::Succeeded { generation, data } if generation == state.generation => {
                PageState {
                    generation,
                    status: FetchStatus::Loaded(data),
                }
            }
            FetchIntent::Failed {
                generation,
                message,
            } if generation == state.generation => PageState {
                generation,
                status: FetchStatus::Failed(message),
            },
            // Out-of-order start or a settle for a superseded request.
            _ => state,
        }
    }
}
