use std::cell::RefCell;
use std::rc::Rc;

use crate::animate::{Animator, Ease, Props, Tween};
use crate::host::{Element, EventKind, Host, Propagation, Target};

pub(crate) const FILTER_BUTTON_SELECTOR: &str = ".filter-btn";
pub(crate) const PROJECT_CARD_SELECTOR: &str = ".project-card";
pub(crate) const ALL_CATEGORIES: &str = "all";
const ACTIVE_CLASS: &str = "active";
const DIMMED_OPACITY: f64 = 0.3;
const DIMMED_SCALE: f64 = 0.95;
const FILTER_SECONDS: f64 = 0.3;

pub(crate) fn matches_filter(filter: &str, category: Option<&str>) -> bool {
    filter == ALL_CATEGORIES || category == Some(filter)
}

fn card_props(shown: bool) -> Props {
    if shown {
        Props::default().opacity(1.0).scale(1.0)
    } else {
        Props::default().opacity(DIMMED_OPACITY).scale(DIMMED_SCALE)
    }
}

pub(crate) struct ProjectFilter<N: Element> {
    buttons: Vec<N>,
    cards: Vec<N>,
    selection: String,
    animator: Rc<dyn Animator<N>>,
}

impl<N: Element> ProjectFilter<N> {
    #[cfg(test)]
    pub(crate) fn selection(&self) -> &str {
        &self.selection
    }

    /// Indices of the cards currently shown at full strength.
    #[cfg(test)]
    pub(crate) fn shown(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| matches_filter(&self.selection, card.data("category").as_deref()))
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn select(&mut self, button_index: usize) {
        let Some(pressed) = self.buttons.get(button_index) else {
            return;
        };
        for button in &self.buttons {
            button.remove_class(ACTIVE_CLASS);
        }
        pressed.add_class(ACTIVE_CLASS);
        self.selection = pressed.data("filter").unwrap_or_else(|| ALL_CATEGORIES.to_string());

        for card in &self.cards {
            let shown = matches_filter(&self.selection, card.data("category").as_deref());
            self.animator.tween(
                std::slice::from_ref(card),
                Tween::to(card_props(shown), FILTER_SECONDS).ease(Ease::Power2Out),
            );
        }
    }
}

pub(crate) fn install<H: Host>(
    host: &H,
    animator: Rc<dyn Animator<H::Node>>,
) -> Rc<RefCell<ProjectFilter<H::Node>>> {
    let buttons = host.select_all(FILTER_BUTTON_SELECTOR);
    let filter = Rc::new(RefCell::new(ProjectFilter {
        buttons: buttons.clone(),
        cards: host.select_all(PROJECT_CARD_SELECTOR),
        selection: ALL_CATEGORIES.to_string(),
        animator,
    }));

    for (index, button) in buttons.into_iter().enumerate() {
        let handle = filter.clone();
        host.listen(
            Target::Node(button),
            EventKind::Click,
            Box::new(move |_| {
                handle.borrow_mut().select(index);
                Propagation::Continue
            }),
        );
    }

    filter
}
