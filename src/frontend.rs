use std::rc::Rc;

use serde_json::json;
use web_sys::window;
use yew::prelude::*;

use crate::contact::SimulatedTransport;
use crate::controller::{PageController, Services};
use crate::logging::{log_event, LogLevel};
use crate::scheduler::Scheduler;
use crate::web::{
    detect_animator, load_config, preference_store, BrowserEntropy, BrowserScheduler, WebHost,
};

struct Stat {
    count: u32,
    label: &'static str,
}

const STATS: [Stat; 3] = [
    Stat {
        count: 5,
        label: "Years Experience",
    },
    Stat {
        count: 40,
        label: "Projects Shipped",
    },
    Stat {
        count: 25,
        label: "Happy Clients",
    },
];

struct Skill {
    name: &'static str,
    level: u8,
}

const SKILLS: [Skill; 6] = [
    Skill {
        name: "Rust",
        level: 90,
    },
    Skill {
        name: "TypeScript",
        level: 85,
    },
    Skill {
        name: "WebAssembly",
        level: 75,
    },
    Skill {
        name: "PostgreSQL",
        level: 80,
    },
    Skill {
        name: "Docker",
        level: 70,
    },
    Skill {
        name: "UI Motion",
        level: 65,
    },
];

struct Project {
    title: &'static str,
    category: &'static str,
    summary: &'static str,
}

const PROJECTS: [Project; 4] = [
    Project {
        title: "Signal Board",
        category: "frontend",
        summary: "Realtime dashboard with animated charts and keyboard-first navigation.",
    },
    Project {
        title: "Ledger API",
        category: "backend",
        summary: "Double-entry accounting service with idempotent writes.",
    },
    Project {
        title: "Queue Relay",
        category: "backend",
        summary: "Durable job fan-out over a small Postgres-backed queue.",
    },
    Project {
        title: "Studio Site",
        category: "fullstack",
        summary: "Content-managed marketing site with server-rendered previews.",
    },
];

const FILTERS: [(&str, &str); 4] = [
    ("all", "All"),
    ("frontend", "Frontend"),
    ("backend", "Backend"),
    ("fullstack", "Full Stack"),
];

const SECTIONS: [(&str, &str); 5] = [
    ("home", "Home"),
    ("about", "About"),
    ("skills", "Skills"),
    ("projects", "Projects"),
    ("contact", "Contact"),
];

/// Keeps the host and every installed effect alive while `App` is mounted.
/// Dropping it removes listeners and observers and cancels pending timers.
struct MountedEffects {
    services: Services<WebHost>,
}

impl Drop for MountedEffects {
    fn drop(&mut self) {
        self.services.host.teardown();
        self.services.scheduler.cancel_all();
    }
}

fn mount_effects() -> Option<MountedEffects> {
    let host = match WebHost::new() {
        Ok(host) => Rc::new(host),
        Err(error) => {
            log_event(LogLevel::Warn, "effects_unavailable", json!({ "error": error.to_string() }));
            return None;
        }
    };

    let config = load_config(&host);
    let browser = host.window().clone();
    let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new());
    let services = Services {
        animator: detect_animator(&browser),
        store: preference_store(&browser),
        entropy: Rc::new(BrowserEntropy),
        transport: Rc::new(SimulatedTransport::new(scheduler.clone(), &config)),
        scheduler,
        host,
        config,
    };
    PageController::install(&services);

    Some(MountedEffects { services })
}

#[derive(Properties, PartialEq)]
struct SkillCardProps {
    name: AttrValue,
    level: u8,
}

#[function_component(SkillCard)]
fn skill_card(props: &SkillCardProps) -> Html {
    html! {
        <div class="skill-card reveal-up">
            <div class="skill-header">
                <span class="skill-name">{props.name.clone()}</span>
                <span class="skill-level">{format!("{}%", props.level)}</span>
            </div>
            <div class="progress-bar">
                <div class="progress-fill" data-width={props.level.to_string()}></div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ProjectCardProps {
    title: AttrValue,
    category: AttrValue,
    summary: AttrValue,
}

#[function_component(ProjectCard)]
fn project_card(props: &ProjectCardProps) -> Html {
    html! {
        <article class="project-card reveal-up" data-category={props.category.clone()}>
            <span class="project-category">{props.category.clone()}</span>
            <h3 class="project-title">{props.title.clone()}</h3>
            <p class="project-summary">{props.summary.clone()}</p>
        </article>
    }
}

#[function_component(App)]
fn app() -> Html {
    use_effect_with((), move |_| {
        let mounted = mount_effects();
        move || drop(mounted)
    });

    html! {
        <>
            <div id="preloader" class="preloader">
                <div class="preloader-content">
                    <span class="preloader-logo">{"PF"}</span>
                    <div class="preloader-bar">
                        <div class="preloader-progress"></div>
                    </div>
                    <span class="preloader-percentage">{"0%"}</span>
                </div>
            </div>

            <div id="cursor" class="cursor" aria-hidden="true">
                <div class="cursor-dot"></div>
                <div class="cursor-outline"></div>
            </div>

            <nav id="navbar" class="navbar">
                <a class="nav-logo" href="#home">{"Portfolio"}</a>
                <ul class="nav-links">
                    { for SECTIONS.iter().map(|(id, label)| html! {
                        <li><a class="nav-link" href={format!("#{id}")}>{*label}</a></li>
                    }) }
                </ul>
                <button
                    id="themeToggle"
                    class="theme-toggle"
                    type="button"
                    aria-label="Toggle theme"
                >
                    <span class="theme-icon" aria-hidden="true">{"◐"}</span>
                </button>
            </nav>

            <main>
                <section id="home" class="hero">
                    <div class="hero-content">
                        <span class="hero-badge">{"Available for work"}</span>
                        <h1 class="hero-title">
                            <span>{"Building"}</span>
                            <span>{"fast, careful"}</span>
                            <span>{"software"}</span>
                        </h1>
                        <p class="hero-description">
                            {"I am a "}<span id="typingText" class="typing-text"></span>
                        </p>
                        <div class="hero-actions">
                            <a class="btn btn-primary magnetic" href="#projects">{"View Work"}</a>
                            <a class="btn btn-secondary magnetic" href="#contact">
                                {"Get in Touch"}
                            </a>
                        </div>
                        <div class="hero-stats">
                            { for STATS.iter().map(|stat| html! {
                                <div class="stat-item" data-count={stat.count.to_string()}>
                                    <span class="stat-number">{"0+"}</span>
                                    <span class="stat-label">{stat.label}</span>
                                </div>
                            }) }
                        </div>
                    </div>
                    <div class="hero-visual">
                        <div class="code-window">
                            <div class="code-header">
                                <span class="dot red"></span>
                                <span class="dot yellow"></span>
                                <span class="dot green"></span>
                            </div>
                            <pre class="code-body">
                                <code>{"fn main() {\n    ship();\n}"}</code>
                            </pre>
                        </div>
                        <div class="floating-card card-1">{"Rust"}</div>
                        <div class="floating-card card-2">{"Wasm"}</div>
                        <div class="floating-card card-3">{"Web"}</div>
                    </div>
                    <a class="scroll-indicator" href="#about" aria-label="Scroll to about">
                        <span class="scroll-wheel"></span>
                    </a>
                </section>

                <section id="about" class="section about">
                    <h2 class="section-title reveal-up">{"About"}</h2>
                    <p class="about-text reveal-left">
                        {"Engineer focused on reliable backends and interfaces that feel quick."}
                    </p>
                    <p class="about-text reveal-right">
                        {"Most of my recent work is in Rust, on both sides of the wire."}
                    </p>
                </section>

                <section id="skills" class="section skills">
                    <h2 class="section-title reveal-up">{"Skills"}</h2>
                    <div class="skills-grid">
                        { for SKILLS.iter().map(|skill| html! {
                            <SkillCard name={skill.name} level={skill.level} />
                        }) }
                    </div>
                </section>

                <section id="projects" class="section projects">
                    <h2 class="section-title reveal-up">{"Projects"}</h2>
                    <div class="project-filters">
                        { for FILTERS.iter().map(|(filter, label)| html! {
                            <button
                                class={classes!(
                                    "filter-btn",
                                    (*filter == "all").then_some("active")
                                )}
                                type="button"
                                data-filter={*filter}
                            >
                                {*label}
                            </button>
                        }) }
                    </div>
                    <div class="projects-grid">
                        { for PROJECTS.iter().map(|project| html! {
                            <ProjectCard
                                title={project.title}
                                category={project.category}
                                summary={project.summary}
                            />
                        }) }
                    </div>
                </section>

                <section id="contact" class="section contact">
                    <h2 class="section-title reveal-up">{"Contact"}</h2>
                    <form id="contactForm" class="contact-form reveal-up">
                        <input type="text" name="name" placeholder="Name" required=true />
                        <input type="email" name="email" placeholder="Email" required=true />
                        <textarea
                            name="message"
                            placeholder="Message"
                            rows="5"
                            required=true
                        ></textarea>
                        <button class="btn btn-primary magnetic" type="submit">
                            <span class="btn-text">{"Send Message"}</span>
                        </button>
                    </form>
                </section>
            </main>

            <button id="backToTop" class="back-to-top" type="button" aria-label="Back to top">
                {"↑"}
            </button>

            <nav id="mobileNav" class="mobile-nav">
                { for SECTIONS.iter().map(|(id, label)| html! {
                    <a class="mobile-nav-item" href={format!("#{id}")}>{*label}</a>
                }) }
                <span class="mobile-nav-indicator"></span>
            </nav>
        </>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
