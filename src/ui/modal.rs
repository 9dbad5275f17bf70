use crate::api::GroceryItem;

use super::actions::ActionRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Quantity,
    Notes,
}

/// Quantity editor pre-filled with the item's current quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityEdit {
    pub item: GroceryItem,
    pub quantity: String,
    pub notes: String,
    pub focus: EditField,
}

impl QuantityEdit {
    pub fn new(item: GroceryItem) -> Self {
        let quantity = format_quantity(item.quantity);
        Self {
            item,
            quantity,
            notes: String::new(),
            focus: EditField::Quantity,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            EditField::Quantity => &mut self.quantity,
            EditField::Notes => &mut self.notes,
        }
    }

    pub fn push(&mut self, ch: char) {
        self.field_mut().push(ch);
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }

    pub fn switch_field(&mut self) {
        self.focus = match self.focus {
            EditField::Quantity => EditField::Notes,
            EditField::Notes => EditField::Quantity,
        };
    }
}

/// Dialogs that take over input until answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Confirm {
        prompt: String,
        request: ActionRequest,
    },
    QuantityEdit(QuantityEdit),
    /// Countdown before the forced logout; only extend or logout close it.
    SessionWarning,
    Logout,
}

impl Modal {
    pub fn title(&self) -> &'static str {
        match self {
            Modal::Confirm { .. } => "Confirm",
            Modal::QuantityEdit(_) => "Quick Edit",
            Modal::SessionWarning => "Session Expiring",
            Modal::Logout => "Log out",
        }
    }

    pub fn dismissable(&self) -> bool {
        !matches!(self, Modal::SessionWarning)
    }
}

/// Whole numbers without a trailing `.0`.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    }
}
