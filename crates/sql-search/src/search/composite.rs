//! Composite parameter component tracking.
//!
//! A composite value renders as nested `EXISTS` subqueries, one per
//! component. Component 0 opens a subquery and leaves it open; every later
//! component opens and closes its own subquery, correlated to component 0 on
//! `CompositeCorrelationId`; the last component also closes component 0's.
//!
//! [`CompositeCursor`] enforces the ordering this relies on: components of
//! one value arrive as 0, 1, ..., n-1 with no gaps. Several values may follow
//! each other (e.g. inside an OR), each starting again at 0.

use crate::error::{SearchQueryError, SearchQueryResult};
use crate::types::SearchParameterInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    /// No component rendered yet.
    Idle,
    /// Component 0's subquery is open; `last` was rendered most recently.
    Open { last: u8 },
    /// The last component closed the group.
    Closed,
}

/// What the compiler must emit around one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStep {
    /// Append the correlation join to component 0 and close this component's subquery.
    pub correlate: bool,
    /// Close component 0's subquery after this component.
    pub close_group: bool,
}

/// Tracks rendering of one composite parameter's components.
#[derive(Debug)]
pub struct CompositeCursor {
    parameter: String,
    component_count: usize,
    state: CursorState,
}

impl CompositeCursor {
    /// Starts tracking `parameter`.
    pub fn new(parameter: &SearchParameterInfo) -> Self {
        Self {
            parameter: parameter.name.clone(),
            component_count: parameter.components.len(),
            state: CursorState::Idle,
        }
    }

    /// Advances to `component_index`.
    pub fn enter(&mut self, component_index: u8) -> SearchQueryResult<ComponentStep> {
        if usize::from(component_index) >= self.component_count {
            return Err(SearchQueryError::CompositeComponentOutOfRange {
                parameter: self.parameter.clone(),
                component_index,
                component_count: self.component_count,
            });
        }

        let expected = match self.state {
            CursorState::Idle | CursorState::Closed => 0,
            CursorState::Open { last } => last.saturating_add(1),
        };
        if component_index != expected {
            return Err(SearchQueryError::CompositeComponentOutOfOrder {
                parameter: self.parameter.clone(),
                expected,
                found: component_index,
            });
        }

        let close_group = usize::from(component_index) + 1 == self.component_count;
        self.state = if close_group {
            CursorState::Closed
        } else {
            CursorState::Open {
                last: component_index,
            }
        };

        Ok(ComponentStep {
            correlate: component_index > 0,
            close_group,
        })
    }

    /// Checks that no group was left open.
    pub fn finish(&self) -> SearchQueryResult<()> {
        match self.state {
            CursorState::Idle | CursorState::Closed => Ok(()),
            CursorState::Open { last } => Err(SearchQueryError::IncompleteComposite {
                parameter: self.parameter.clone(),
                rendered: usize::from(last) + 1,
                component_count: self.component_count,
            }),
        }
    }
}
