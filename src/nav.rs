use std::cell::RefCell;
use std::rc::Rc;

use crate::config::EffectsConfig;
use crate::host::{Element, EventKind, Host, Propagation, Target};

pub(crate) const NAVBAR_ID: &str = "navbar";
pub(crate) const MOBILE_NAV_ID: &str = "mobileNav";
pub(crate) const BACK_TO_TOP_ID: &str = "backToTop";
pub(crate) const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";
pub(crate) const SECTION_SELECTOR: &str = "section[id]";
pub(crate) const NAV_LINK_SELECTOR: &str = ".nav-link, .mobile-nav-item";
const MOBILE_ITEM_SELECTOR: &str = ".mobile-nav-item";
const INDICATOR_SELECTOR: &str = ".mobile-nav-indicator";
const ACTIVE_CLASS: &str = "active";
const SCROLLED_CLASS: &str = "scrolled";

/// Index of the last section whose top, pulled up by `lookahead`, has been
/// scrolled past.
pub(crate) fn active_section(tops: &[f64], scroll_y: f64, lookahead: f64) -> Option<usize> {
    tops.iter().rposition(|top| top - lookahead <= scroll_y)
}

/// Scroll destination for an in-page `#id` link, leaving room for the fixed navbar.
pub(crate) fn anchor_destination<H: Host>(host: &H, href: &str, offset: f64) -> Option<f64> {
    let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    let target = host.by_id(id)?;
    Some((target.offset_top() - offset).max(0.0))
}

pub(crate) struct NavController<N: Element> {
    navbar: Option<N>,
    sections: Vec<N>,
    links: Vec<N>,
    mobile_nav: Option<N>,
    scrolled_threshold: f64,
    lookahead: f64,
    active: Option<String>,
}

impl<N: Element> NavController<N> {
    #[cfg(test)]
    pub(crate) fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub(crate) fn on_scroll(&mut self, scroll_y: f64) {
        if let Some(navbar) = &self.navbar {
            navbar.toggle_class(SCROLLED_CLASS, scroll_y > self.scrolled_threshold);
        }

        let tops: Vec<f64> = self.sections.iter().map(|section| section.offset_top()).collect();
        self.active = active_section(&tops, scroll_y, self.lookahead)
            .and_then(|index| self.sections[index].attribute("id"));

        let wanted = self.active.as_ref().map(|id| format!("#{id}"));
        for link in &self.links {
            link.remove_class(ACTIVE_CLASS);
            if wanted.is_some() && link.attribute("href") == wanted {
                link.add_class(ACTIVE_CLASS);
            }
        }

        self.move_indicator();
    }

    fn move_indicator(&self) {
        let Some(mobile_nav) = &self.mobile_nav else {
            return;
        };
        let Some(indicator) = mobile_nav.find(INDICATOR_SELECTOR) else {
            return;
        };
        let index = mobile_nav
            .find_all(MOBILE_ITEM_SELECTOR)
            .iter()
            .position(|item| item.has_class(ACTIVE_CLASS));

        if let Some(index) = index {
            indicator.set_style("transform", &format!("translateX({}%)", index * 100));
        }
    }
}

pub(crate) fn install<H: Host>(
    host: &Rc<H>,
    config: &EffectsConfig,
) -> Rc<RefCell<NavController<H::Node>>> {
    let offset = config.anchor_offset;
    for anchor in host.select_all(ANCHOR_SELECTOR) {
        let href = anchor.attribute("href").unwrap_or_default();
        let page = host.clone();
        host.listen(
            Target::Node(anchor),
            EventKind::Click,
            Box::new(move |_| {
                if let Some(top) = anchor_destination(page.as_ref(), &href, offset) {
                    page.smooth_scroll_to(top);
                }
                Propagation::PreventDefault
            }),
        );
    }

    if let Some(back_to_top) = host.by_id(BACK_TO_TOP_ID) {
        let page = host.clone();
        host.listen(
            Target::Node(back_to_top),
            EventKind::Click,
            Box::new(move |_| {
                page.smooth_scroll_to(0.0);
                Propagation::Continue
            }),
        );
    }

    let controller = Rc::new(RefCell::new(NavController {
        navbar: host.by_id(NAVBAR_ID),
        sections: host.select_all(SECTION_SELECTOR),
        links: host.select_all(NAV_LINK_SELECTOR),
        mobile_nav: host.by_id(MOBILE_NAV_ID),
        scrolled_threshold: config.scrolled_threshold,
        lookahead: config.section_lookahead,
        active: None,
    }));
    controller.borrow_mut().on_scroll(host.scroll_y());

    let tracking = controller.clone();
    let page = host.clone();
    host.listen(
        Target::Window,
        EventKind::Scroll,
        Box::new(move |_| {
            tracking.borrow_mut().on_scroll(page.scroll_y());
            Propagation::Continue
        }),
    );

    controller
}
