use std::collections::BTreeSet;
use std::time::Duration;

use crate::api::{ActionReply, ApiCall, BulkAction, BulkBody, GroceryApi, GroceryItem, QuickEditBody};
use crate::error::Result;

use super::notifications::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    EditQuantity,
    MarkPurchased,
    Delete,
    AddToShoppingList,
    BulkMarkPurchased,
    BulkDelete,
}

/// Static description of how one action kind is reported.
#[derive(Debug)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub label: &'static str,
    /// Shown when the server answers `success: false` without an error text.
    pub rejected: &'static str,
    /// Shown when the request never produced a readable reply.
    pub transport: &'static str,
    /// Whether a successful reply schedules a full refresh.
    pub refresh: bool,
}

static ACTION_SPECS: [ActionSpec; 6] = [
    ActionSpec {
        kind: ActionKind::EditQuantity,
        label: "Edit quantity",
        rejected: "Failed to update item",
        transport: "Error updating item",
        refresh: true,
    },
    ActionSpec {
        kind: ActionKind::MarkPurchased,
        label: "Mark purchased",
        rejected: "Failed to mark as purchased",
        transport: "Error marking item as purchased",
        refresh: true,
    },
    ActionSpec {
        kind: ActionKind::Delete,
        label: "Delete",
        rejected: "Failed to delete item",
        transport: "Error deleting item",
        refresh: true,
    },
    ActionSpec {
        kind: ActionKind::AddToShoppingList,
        label: "Add to shopping list",
        rejected: "Failed to add to shopping list",
        transport: "Error adding to shopping list",
        refresh: false,
    },
    ActionSpec {
        kind: ActionKind::BulkMarkPurchased,
        label: "Mark selected purchased",
        rejected: "Bulk action failed",
        transport: "Error performing bulk action",
        refresh: true,
    },
    ActionSpec {
        kind: ActionKind::BulkDelete,
        label: "Delete selected",
        rejected: "Bulk action failed",
        transport: "Error performing bulk action",
        refresh: true,
    },
];

impl ActionKind {
    pub fn spec(self) -> &'static ActionSpec {
        ACTION_SPECS
            .iter()
            .find(|spec| spec.kind == self)
            .unwrap_or(&ACTION_SPECS[0])
    }

    pub fn is_bulk(self) -> bool {
        matches!(self, ActionKind::BulkMarkPurchased | ActionKind::BulkDelete)
    }
}

/// Item ids ticked for bulk operations. Cleared on navigation and refresh.
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.ids.extend(ids.into_iter().map(str::to_string));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// A request ready to send, with what is needed to report on it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub call: ApiCall,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Ask the user first; send `request` only on a yes.
    Confirm { prompt: String, request: ActionRequest },
    Send(ActionRequest),
    /// Refused locally, nothing is sent.
    Reject(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub notice: Notice,
    pub refresh_after: Option<Duration>,
}

/// Turns user intents into API calls and API replies into toasts.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    refresh_delay: Duration,
}

impl Dispatcher {
    pub fn new(refresh_delay: Duration) -> Self {
        Self { refresh_delay }
    }

    /// Single-item actions other than quantity edits.
    pub fn prepare_item(&self, kind: ActionKind, item: &GroceryItem) -> Option<Step> {
        let item_id = item.id.clone();
        let (call, prompt) = match kind {
            ActionKind::MarkPurchased => (
                ApiCall::MarkPurchased { item_id },
                Some(format!("Mark \"{}\" as purchased?", item.name)),
            ),
            ActionKind::Delete => (
                ApiCall::QuickDelete { item_id },
                Some(format!("Are you sure you want to delete \"{}\"?", item.name)),
            ),
            ActionKind::AddToShoppingList => (ApiCall::AddToShoppingList { item_id }, None),
            ActionKind::EditQuantity | ActionKind::BulkMarkPurchased | ActionKind::BulkDelete => {
                return None
            }
        };

        let request = ActionRequest {
            kind,
            call,
            subject: item.name.clone(),
        };
        Some(match prompt {
            Some(prompt) => Step::Confirm { prompt, request },
            None => Step::Send(request),
        })
    }

    /// Quantity edit from the modal's raw input. `None` means the edit was
    /// abandoned: empty or non-numeric input.
    pub fn prepare_edit(&self, item: &GroceryItem, input: &str, notes: &str) -> Option<Step> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let quantity: f64 = input.parse().ok().filter(|value: &f64| value.is_finite())?;
        if quantity < 0.0 {
            return Some(Step::Reject(Notice::new(
                "Quantity cannot be negative",
                Severity::Error,
            )));
        }

        let notes = notes.trim();
        Some(Step::Send(ActionRequest {
            kind: ActionKind::EditQuantity,
            call: ApiCall::QuickEdit {
                item_id: item.id.clone(),
                body: QuickEditBody {
                    quantity: quantity.trunc() as i64,
                    notes: (!notes.is_empty()).then(|| notes.to_string()),
                },
            },
            subject: item.name.clone(),
        }))
    }

    pub fn prepare_bulk(&self, kind: ActionKind, selection: &SelectionSet) -> Option<Step> {
        let (action, prompt) = match kind {
            ActionKind::BulkMarkPurchased => (
                BulkAction::MarkPurchased,
                format!("Mark {} items as purchased?", selection.len()),
            ),
            ActionKind::BulkDelete => (
                BulkAction::Delete,
                format!("Delete {} items permanently?", selection.len()),
            ),
            _ => return None,
        };

        if selection.is_empty() {
            return Some(Step::Reject(Notice::new("No items selected", Severity::Warning)));
        }

        let count = selection.len();
        Some(Step::Confirm {
            prompt,
            request: ActionRequest {
                kind,
                call: ApiCall::Bulk(BulkBody {
                    action,
                    item_ids: selection.ids(),
                }),
                subject: format!("{count} items"),
            },
        })
    }

    /// Send `request` and report on it.
    pub async fn execute<A>(&self, api: &A, request: &ActionRequest) -> ActionOutcome
    where
        A: GroceryApi + Sync,
    {
        let reply = api.send(&request.call).await;
        self.outcome(request, reply)
    }

    /// Map the reply to a toast and, on success, a refresh deadline.
    pub fn outcome(&self, request: &ActionRequest, reply: Result<ActionReply>) -> ActionOutcome {
        let spec = request.kind.spec();
        match reply {
            Ok(reply) if reply.success => {
                let message = match request.kind {
                    ActionKind::AddToShoppingList => {
                        format!("Added \"{}\" to shopping list", request.subject)
                    }
                    _ => reply
                        .message
                        .unwrap_or_else(|| format!("{} succeeded", spec.label)),
                };
                ActionOutcome {
                    notice: Notice::new(message, Severity::Success),
                    refresh_after: spec.refresh.then_some(self.refresh_delay),
                }
            }
            Ok(reply) => ActionOutcome {
                notice: Notice::new(
                    reply.error.unwrap_or_else(|| spec.rejected.to_string()),
                    Severity::Error,
                ),
                refresh_after: None,
            },
            Err(err) => {
                log::error!("{} request failed: {err}", spec.label);
                ActionOutcome {
                    notice: Notice::new(spec.transport, Severity::Error),
                    refresh_after: None,
                }
            }
        }
    }
}
