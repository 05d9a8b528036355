//! Page content and the animation presets each section registers on mount.

use std::time::Duration;

use greenearth_core::{
    document::MemoryDocument,
    easing::Easing,
    lifecycle::Scope,
    model::{Bounds, ElementId, PropertySet, Repeat, Style, Timing},
    routes::{PageHost, Route},
    scene::{AnimationSpec, BindingId, ScrollScene},
    trigger::{GrammarError, Scrub, TriggerSpec},
};
use tracing::{debug, warn};

/// Document pixels per terminal row.
pub(crate) const ROW_PX: f32 = 24.0;
/// Document pixels per terminal column.
pub(crate) const COL_PX: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Title,
    Heading,
    Text,
    Item,
    Stat,
    Step,
    Ornament,
}

/// Entrance styles used across the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reveal {
    /// Page hero, played as soon as the page mounts.
    Hero,
    FadeUp,
    Stagger,
    Pop,
    SlideIn,
    /// Statistic counters, fired once.
    Counter,
    /// Scrubbed drift while the section crosses the viewport.
    Parallax,
    /// Scrubbed fade tied to a fixed scroll distance.
    Narrative,
    /// Steps popping in one after another as the list is scrolled through.
    Journey,
    /// Endless bobbing of decorative elements.
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    OnMount,
    Toggle,
    Once,
    Scrub(Option<u64>),
}

#[derive(Debug, Clone)]
struct Preset {
    from: PropertySet,
    to: PropertySet,
    duration_ms: u64,
    stagger_ms: u64,
    ease: &'static str,
    start: &'static str,
    end: Option<&'static str>,
    actions: &'static str,
    mode: Mode,
    repeat: Repeat,
    yoyo: bool,
}

impl Preset {
    fn timing(&self) -> Result<Timing, GrammarError> {
        Ok(Timing::new(Duration::from_millis(self.duration_ms))
            .with_stagger(Duration::from_millis(self.stagger_ms))
            .with_easing(self.ease.parse::<Easing>()?)
            .with_repeat(self.repeat)
            .with_yoyo(self.yoyo))
    }

    fn trigger(&self) -> Result<Option<TriggerSpec>, GrammarError> {
        let mut trigger = TriggerSpec::at(self.start.parse()?);
        if let Some(end) = self.end {
            trigger = trigger.until(end.parse()?);
        }
        let trigger = match self.mode {
            Mode::OnMount => return Ok(None),
            Mode::Toggle => trigger.toggle(self.actions.parse()?),
            Mode::Once => trigger.toggle(self.actions.parse()?).once(),
            Mode::Scrub(None) => trigger.scrub(Scrub::Instant),
            Mode::Scrub(Some(lag)) => trigger.scrub(Scrub::Smoothed(Duration::from_millis(lag))),
        };
        Ok(Some(trigger))
    }
}

impl Reveal {
    #[cfg(test)]
    const ALL: [Reveal; 10] = [
        Reveal::Hero,
        Reveal::FadeUp,
        Reveal::Stagger,
        Reveal::Pop,
        Reveal::SlideIn,
        Reveal::Counter,
        Reveal::Parallax,
        Reveal::Narrative,
        Reveal::Journey,
        Reveal::Float,
    ];

    fn preset(self) -> Preset {
        let visible = PropertySet::new().opacity(1.0).x(0.0).y(0.0).scale(1.0);
        let base = Preset {
            from: PropertySet::new().opacity(0.0).y(50.0),
            to: visible,
            duration_ms: 1000,
            stagger_ms: 0,
            ease: "power3.out",
            start: "top 80%",
            end: Some("bottom 20%"),
            actions: "play none none reverse",
            mode: Mode::Toggle,
            repeat: Repeat::Never,
            yoyo: false,
        };

        match self {
            Reveal::Hero => Preset {
                from: PropertySet::new().opacity(0.0).y(30.0),
                stagger_ms: 200,
                mode: Mode::OnMount,
                ..base
            },
            Reveal::FadeUp => base,
            Reveal::Stagger => Preset {
                from: PropertySet::new().opacity(0.0).y(30.0),
                duration_ms: 800,
                stagger_ms: 100,
                ease: "power2.out",
                end: None,
                ..base
            },
            Reveal::Pop => Preset {
                from: PropertySet::new().opacity(0.0).scale(0.8),
                duration_ms: 600,
                stagger_ms: 100,
                ease: "back.out(1.7)",
                start: "top 75%",
                end: None,
                ..base
            },
            Reveal::SlideIn => Preset {
                from: PropertySet::new().opacity(0.0).x(-100.0),
                duration_ms: 800,
                stagger_ms: 150,
                ease: "power2.out",
                end: None,
                ..base
            },
            // The value track runs 0 to 1; each line scales it by its own target.
            Reveal::Counter => Preset {
                from: PropertySet::new().value(0.0),
                to: PropertySet::new().value(1.0),
                duration_ms: 2000,
                ease: "power2.out",
                end: None,
                actions: "play none none none",
                mode: Mode::Once,
                ..base
            },
            Reveal::Parallax => Preset {
                from: PropertySet::new().y(60.0),
                to: PropertySet::new().y(-60.0),
                ease: "none",
                start: "top bottom",
                end: Some("bottom top"),
                mode: Mode::Scrub(Some(1000)),
                ..base
            },
            Reveal::Narrative => Preset {
                from: PropertySet::new().opacity(0.2).x(-40.0),
                ease: "none",
                start: "top 70%",
                end: Some("+=300"),
                stagger_ms: 150,
                mode: Mode::Scrub(None),
                ..base
            },
            Reveal::Journey => Preset {
                from: PropertySet::new().opacity(0.0).scale(0.5),
                duration_ms: 200,
                stagger_ms: 200,
                ease: "back.out(2)",
                end: Some("+=50%"),
                mode: Mode::Scrub(Some(1000)),
                ..base
            },
            Reveal::Float => Preset {
                from: PropertySet::new().y(0.0),
                to: PropertySet::new().y(-15.0),
                duration_ms: 3000,
                ease: "sine.inOut",
                mode: Mode::OnMount,
                repeat: Repeat::Forever,
                yoyo: true,
                ..base
            },
        }
    }
}

struct Section {
    heading: &'static str,
    kind: Kind,
    reveal: Reveal,
    lines: &'static [&'static str],
}

struct Page {
    tagline: &'static str,
    sections: &'static [Section],
}

const HOME: Page = Page {
    tagline: "Telangana's first zero-waste facility, powered by four CSIR-IICT validated technologies.",
    sections: &[
        Section {
            heading: "Why Green Earth",
            kind: Kind::Item,
            reveal: Reveal::Pop,
            lines: &[
                "CSIR-IICT Validated",
                "TGPCB Compliant",
                "ISO Certified",
                "100% landfill diversion for partner campuses",
            ],
        },
        Section {
            heading: "Our Services",
            kind: Kind::Item,
            reveal: Reveal::Stagger,
            lines: &[
                "Organic waste to compost (AAC)",
                "Biogas from food waste (AGR)",
                "Plastic to fuel oil (Pyrolysis)",
                "Dry waste recycling and material recovery",
            ],
        },
        Section {
            heading: "Impact So Far",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &[
                "12,500+ tonnes of waste processed",
                "8,200 tonnes of CO2 emissions avoided",
                "150+ partner organisations",
            ],
        },
        Section {
            heading: "The Circular Journey",
            kind: Kind::Text,
            reveal: Reveal::Narrative,
            lines: &[
                "Waste arrives segregated at source.",
                "Each stream is routed to the technology that suits it.",
                "Every output re-enters the economy as a resource.",
            ],
        },
        Section {
            heading: "What Our Partners Say",
            kind: Kind::Text,
            reveal: Reveal::SlideIn,
            lines: &[
                "\"Our campus went zero-landfill in under six months.\"",
                "\"Transparent reporting made our ESG audit effortless.\"",
            ],
        },
    ],
};

const FACILITIES: Page = Page {
    tagline: "Our Facilities: four technologies under one roof.",
    sections: &[
        Section {
            heading: "Core Technologies",
            kind: Kind::Item,
            reveal: Reveal::Pop,
            lines: &[
                "AAC: accelerated aerobic composting",
                "AGR: anaerobic gas lift reactor",
                "Advanced Pyrolysis Unit",
                "Dry Waste Recycling Facility",
            ],
        },
        Section {
            heading: "Facility at a Glance",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &["50 TPD combined capacity", "Round-the-clock monitored operations"],
        },
        Section {
            heading: "Inside the Plant",
            kind: Kind::Text,
            reveal: Reveal::Parallax,
            lines: &[
                "Composting units and processing area",
                "Reactor hall and gas storage",
            ],
        },
    ],
};

const AAC: Page = Page {
    tagline: "Organic waste processing: turning food and garden waste into certified compost.",
    sections: &[
        Section {
            heading: "How AAC Technology Works",
            kind: Kind::Item,
            reveal: Reveal::Stagger,
            lines: &[
                "Waste Collection & Segregation",
                "Microbial Inoculation",
                "Curing & Quality Testing",
            ],
        },
        Section {
            heading: "Key Benefits",
            kind: Kind::Item,
            reveal: Reveal::Pop,
            lines: &[
                "Compost ready in 21 days",
                "Odour-free enclosed processing",
                "Pathogen elimination verified",
            ],
        },
        Section {
            heading: "Technical Specifications",
            kind: Kind::Text,
            reveal: Reveal::SlideIn,
            lines: &[
                "Daily capacity: 20 tonnes",
                "Composting time: 21 days",
                "Output: NPK-rich organic manure",
            ],
        },
        Section {
            heading: "Environmental Impact",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &[
                "7,300 tonnes of organic waste diverted from landfills annually",
                "40% reduction in chemical fertilizer dependency",
            ],
        },
    ],
};

const AGR: Page = Page {
    tagline: "Anaerobic Gas Lift Reactor: biogas and slurry from wet waste.",
    sections: &[
        Section {
            heading: "How the Reactor Works",
            kind: Kind::Item,
            reveal: Reveal::Stagger,
            lines: &[
                "Feedstock preparation",
                "Anaerobic digestion",
                "Gas lift circulation",
                "Biogas capture and scrubbing",
            ],
        },
        Section {
            heading: "Outputs",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &["1,200 m3 of biogas per day", "Liquid bio-fertilizer"],
        },
        Section {
            heading: "Reactor Hall",
            kind: Kind::Text,
            reveal: Reveal::Parallax,
            lines: &["Sealed digesters operating at mesophilic temperatures."],
        },
    ],
};

const PYROLYSIS: Page = Page {
    tagline: "Advanced Pyrolysis Unit: non-recyclable plastics converted into fuel.",
    sections: &[
        Section {
            heading: "Process Stages",
            kind: Kind::Item,
            reveal: Reveal::Stagger,
            lines: &[
                "Shredding and drying",
                "Thermal decomposition without oxygen",
                "Condensation into pyrolysis oil",
                "Char and gas recovery",
            ],
        },
        Section {
            heading: "Yield",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &["70% oil yield", "Zero liquid discharge"],
        },
        Section {
            heading: "Safety",
            kind: Kind::Text,
            reveal: Reveal::SlideIn,
            lines: &["Continuous emission monitoring", "Automated pressure relief"],
        },
    ],
};

const RECYCLING: Page = Page {
    tagline: "Dry Waste Recycling Facility: material recovery at scale.",
    sections: &[
        Section {
            heading: "Streams We Recover",
            kind: Kind::Item,
            reveal: Reveal::Pop,
            lines: &["Paper and cardboard", "PET and HDPE", "Metals", "Glass"],
        },
        Section {
            heading: "Recovery Rate",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &["92% of dry waste recovered"],
        },
    ],
};

const PROCESS: Page = Page {
    tagline: "The Circular Journey: from collection to resource.",
    sections: &[
        Section {
            heading: "Collection",
            kind: Kind::Text,
            reveal: Reveal::Narrative,
            lines: &[
                "Segregated pickup from partner sites.",
                "Weighed and logged on arrival.",
            ],
        },
        Section {
            heading: "Processing",
            kind: Kind::Text,
            reveal: Reveal::Narrative,
            lines: &[
                "Each stream goes to its technology.",
                "Quality checks at every stage.",
            ],
        },
        Section {
            heading: "Return",
            kind: Kind::Text,
            reveal: Reveal::Narrative,
            lines: &["Compost, biogas and fuel re-enter the economy."],
        },
        Section {
            heading: "Five Steps to Zero Waste",
            kind: Kind::Step,
            reveal: Reveal::Journey,
            lines: &[
                "Collection & Segregation",
                "Processing & Treatment",
                "Resource Recovery",
                "Quality Control",
                "Distribution & Impact",
            ],
        },
    ],
};

const IMPACT: Page = Page {
    tagline: "Our Environmental Footprint, measured and verified.",
    sections: &[
        Section {
            heading: "Real World Impact",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &[
                "12,500+ tonnes processed",
                "8,200 tonnes CO2e avoided",
                "3.1 GWh of energy recovered",
            ],
        },
        Section {
            heading: "Circular Economy",
            kind: Kind::Item,
            reveal: Reveal::Stagger,
            lines: &["Compost to farms", "Fuel to industry", "Recyclates to manufacturers"],
        },
        Section {
            heading: "Certified Impact",
            kind: Kind::Text,
            reveal: Reveal::FadeUp,
            lines: &["Audited and verified by leading environmental agencies."],
        },
    ],
};

const REPORTS: Page = Page {
    tagline: "Verified Sustainability: certifications and annual reports.",
    sections: &[
        Section {
            heading: "Certifications",
            kind: Kind::Item,
            reveal: Reveal::Pop,
            lines: &["ISO 14001", "TGPCB Consent to Operate", "CSIR-IICT Technology Validation"],
        },
        Section {
            heading: "Reports",
            kind: Kind::Item,
            reveal: Reveal::SlideIn,
            lines: &["Annual Sustainability Report", "Quarterly Diversion Summary"],
        },
    ],
};

const CLIENTS: Page = Page {
    tagline: "Our Ecosystem: industries that trust us with their waste.",
    sections: &[
        Section {
            heading: "Industries",
            kind: Kind::Item,
            reveal: Reveal::Pop,
            lines: &["Technology parks", "Hospitality", "Healthcare", "Educational campuses"],
        },
        Section {
            heading: "Partners",
            kind: Kind::Stat,
            reveal: Reveal::Counter,
            lines: &["150+ organisations served"],
        },
    ],
};

const BLOGS: Page = Page {
    tagline: "Insights & News from the zero-waste frontier.",
    sections: &[Section {
        heading: "Latest Articles",
        kind: Kind::Item,
        reveal: Reveal::Stagger,
        lines: &[
            "The Science Behind Zero-Waste Management",
            "Why Segregation at Source Matters",
            "From Plastic to Fuel: A Primer",
        ],
    }],
};

const ZERO_WASTE_SCIENCE: Page = Page {
    tagline: "The Science Behind Zero-Waste Management",
    sections: &[
        Section {
            heading: "The Molecular Transformation",
            kind: Kind::Text,
            reveal: Reveal::FadeUp,
            lines: &[
                "Microbes break long organic polymers into simple, stable compounds.",
                "Carbon leaves as CO2 or methane, nutrients stay behind.",
            ],
        },
        Section {
            heading: "Thermodynamics of Pyrolysis",
            kind: Kind::Text,
            reveal: Reveal::FadeUp,
            lines: &[
                "Heat without oxygen cracks plastics into shorter hydrocarbons.",
                "The process recovers more energy than it consumes.",
            ],
        },
        Section {
            heading: "The Biological Engine: AGR",
            kind: Kind::Text,
            reveal: Reveal::FadeUp,
            lines: &["Gas lift circulation keeps the digester mixed without moving parts."],
        },
        Section {
            heading: "Conclusion: Science as a Solution",
            kind: Kind::Text,
            reveal: Reveal::FadeUp,
            lines: &["Zero waste is an engineering problem with known answers."],
        },
    ],
};

const CONTACT: Page = Page {
    tagline: "Get in touch: tell us about your waste and we will design a plan.",
    sections: &[Section {
        heading: "Reach Us",
        kind: Kind::Item,
        reveal: Reveal::SlideIn,
        lines: &["info@greenearth.in", "Telangana, India", "Mon-Sat, 9am to 6pm"],
    }],
};

fn page(route: Route) -> &'static Page {
    match route {
        Route::Home => &HOME,
        Route::Facilities => &FACILITIES,
        Route::Aac => &AAC,
        Route::Agr => &AGR,
        Route::Pyrolysis => &PYROLYSIS,
        Route::Recycling => &RECYCLING,
        Route::Process => &PROCESS,
        Route::Impact => &IMPACT,
        Route::Reports => &REPORTS,
        Route::Clients => &CLIENTS,
        Route::Blogs => &BLOGS,
        Route::ZeroWasteScience => &ZERO_WASTE_SCIENCE,
        Route::Contact => &CONTACT,
    }
}

/// Number at the front of a statistic line, counted up from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Counter {
    prefix: &'static str,
    target: f32,
    decimals: usize,
    suffix: &'static str,
}

impl Counter {
    /// Split `"12,500+ tonnes"` into prefix, number and suffix; `None` without digits.
    fn parse(text: &'static str) -> Option<Self> {
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let (prefix, rest) = text.split_at(start);
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.'))
            .unwrap_or(rest.len());
        let number = rest.get(..end)?.trim_end_matches([',', '.']);
        let suffix = rest.get(number.len()..)?;

        let digits = number.replace(',', "");
        let target = digits.parse::<f32>().ok()?;
        let decimals = digits.split_once('.').map_or(0, |(_, fraction)| fraction.len());
        Some(Self {
            prefix,
            target,
            decimals,
            suffix,
        })
    }

    /// Line text with the number at `fraction` of its target.
    pub(crate) fn display(&self, fraction: f32) -> String {
        let count = self.target * fraction.clamp(0.0, 1.0);
        let number = if self.decimals > 0 {
            format!("{count:.prec$}", prec = self.decimals)
        } else {
            group_thousands(&format!("{:.0}", count.floor()))
        };
        format!("{}{number}{}", self.prefix, self.suffix)
    }
}

fn group_thousands(digits: &str) -> String {
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

/// One rendered line of the mounted page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placed {
    pub element: ElementId,
    pub kind: Kind,
    pub text: &'static str,
    pub counter: Option<Counter>,
}

impl Placed {
    /// Text to draw given the element's current style.
    pub(crate) fn label(&self, style: &Style) -> String {
        match self.counter {
            Some(counter) => counter.display(style.value),
            None => self.text.to_owned(),
        }
    }
}

#[derive(Debug)]
struct Journey {
    binding: BindingId,
    steps: Vec<ElementId>,
}

/// Lays pages out in the document and registers their animations.
#[derive(Debug, Default)]
pub(crate) struct SitePages {
    placed: Vec<Placed>,
    cursor: f32,
    journey: Option<Journey>,
}

impl SitePages {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Lines of the mounted page, top to bottom.
    pub(crate) fn placed(&self) -> &[Placed] {
        &self.placed
    }

    /// Step the reader has scrolled to in the page's step list, if it has one.
    pub(crate) fn active_step(&self, scene: &ScrollScene<MemoryDocument>) -> Option<ElementId> {
        let journey = self.journey.as_ref()?;
        let progress = scene.scrub_progress(journey.binding)?;
        journey
            .steps
            .get(step_index(progress, journey.steps.len()))
            .copied()
    }

    fn place(
        &mut self,
        document: &mut MemoryDocument,
        kind: Kind,
        text: &'static str,
        gap_rows: u8,
    ) -> ElementId {
        let element = document.create(Bounds::new(self.cursor, ROW_PX));
        let counter = if kind == Kind::Stat {
            Counter::parse(text)
        } else {
            None
        };
        self.placed.push(Placed {
            element,
            kind,
            text,
            counter,
        });
        self.cursor += ROW_PX * (1.0 + f32::from(gap_rows));
        element
    }
}

impl PageHost<MemoryDocument> for SitePages {
    fn mount(&mut self, route: Route, scope: &mut Scope<'_, MemoryDocument>) {
        let page = page(route);
        self.cursor = ROW_PX;

        let title = self.place(scope.document_mut(), Kind::Title, route.title(), 1);
        let tagline = self.place(scope.document_mut(), Kind::Text, page.tagline, 1);
        let ornament = self.place(scope.document_mut(), Kind::Ornament, ORNAMENT, 3);
        register(scope, Reveal::Hero, vec![title, tagline]);
        register(scope, Reveal::Float, vec![ornament]);

        for section in page.sections {
            let heading = self.place(scope.document_mut(), Kind::Heading, section.heading, 1);
            let lines = section
                .lines
                .iter()
                .copied()
                .map(|line| self.place(scope.document_mut(), section.kind, line, 0))
                .collect::<Vec<_>>();
            self.cursor += ROW_PX * 3.0;

            register(scope, Reveal::FadeUp, vec![heading]);
            match section.reveal {
                // Every counter fires on its own when it reaches the trigger line.
                Reveal::Counter => {
                    for line in lines {
                        register(scope, Reveal::Counter, vec![line]);
                    }
                }
                Reveal::Journey => {
                    if let Some(binding) = register(scope, Reveal::Journey, lines.clone()) {
                        self.journey = Some(Journey {
                            binding,
                            steps: lines,
                        });
                    }
                }
                reveal => {
                    register(scope, reveal, lines);
                }
            }
        }
        debug!(%route, elements = self.placed.len(), handles = scope.len(), "page mounted");
    }

    fn unmount(&mut self, route: Route, document: &mut MemoryDocument) {
        for placed in self.placed.drain(..) {
            document.detach(placed.element);
        }
        self.cursor = 0.0;
        self.journey = None;
        debug!(%route, "page unmounted");
    }
}

/// Floating decoration under every page's hero.
const ORNAMENT: &str = "~ ❦ ~";

/// Index of the step reached at `progress`: `floor(progress * count)`, capped at the last.
fn step_index(progress: f32, count: usize) -> usize {
    let Ok(count) = u16::try_from(count) else {
        return 0;
    };
    (1..count)
        .take_while(|&step| progress * f32::from(count) >= f32::from(step))
        .count()
}

/// Register one preset for `targets`; returns the binding of scroll-triggered presets.
fn register(
    scope: &mut Scope<'_, MemoryDocument>,
    reveal: Reveal,
    targets: Vec<ElementId>,
) -> Option<BindingId> {
    if targets.is_empty() {
        return None;
    }
    let preset = reveal.preset();
    let parsed = preset
        .timing()
        .and_then(|timing| preset.trigger().map(|trigger| (timing, trigger)));
    let (timing, trigger) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, ?reveal, "skipping animation with invalid preset");
            return None;
        }
    };

    match trigger {
        Some(trigger) => {
            let spec = AnimationSpec::new(targets)
                .from(preset.from)
                .to(preset.to)
                .timing(timing)
                .trigger(trigger);
            let binding = scope.animate(spec);
            if binding.is_none() {
                debug!(?reveal, "targets left the document before registration");
            }
            binding
        }
        None => {
            if let Some(timeline) = scope.timeline(&targets, &preset.from, &preset.to, timing) {
                scope.play(timeline);
            }
            None
        }
    }
}
