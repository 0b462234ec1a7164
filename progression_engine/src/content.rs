//! Progression Engine — Static Content Catalog
//!
//! Read-only reference data: the 60-day program table and the
//! archetype profiles. The engine consumes it through the
//! `ContentCatalog` trait and never mutates it.

use crate::domain::{Archetype, MasteryLevel, MAX_ARCHETYPE_LEVEL, PROGRAM_DAYS};

/// Metadata for one program day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayContent {
    pub day: u32,
    pub week: u32,
    pub element: &'static str,
    pub mastery_level: MasteryLevel,
    pub theme: String,
    pub focus: String,
    pub quantum_upgrade: Option<String>,
}

/// One content tier of an archetype (levels 1, 2 and 3+).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeTier {
    pub title: &'static str,
    pub abilities: &'static [&'static str],
    pub missions: &'static [&'static str],
    pub oracle_guidance: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub archetype: Archetype,
    pub name: &'static str,
    pub description: &'static str,
    pub tiers: [ArchetypeTier; 3],
}

/// Content lookup collaborator.
pub trait ContentCatalog {
    /// Day metadata, or `None` outside `1..=60`.
    fn day(&self, day: u32) -> Option<DayContent>;

    fn profile(&self, archetype: Archetype) -> &ArchetypeProfile;

    /// Content tier for an archetype level, or `None` outside `1..=5`.
    fn tier(&self, archetype: Archetype, level: u8) -> Option<&ArchetypeTier> {
        tier_index(level).map(|idx| &self.profile(archetype).tiers[idx])
    }

    /// Mission candidates for an archetype level; empty if the level
    /// is outside `1..=5`.
    fn mission_directives(&self, archetype: Archetype, level: u8) -> Vec<String> {
        owned(self.tier(archetype, level).map(|t| t.missions))
    }

    fn abilities(&self, archetype: Archetype, level: u8) -> Vec<String> {
        owned(self.tier(archetype, level).map(|t| t.abilities))
    }

    /// Archetype guidance candidates for the oracle tick.
    fn archetype_guidance(&self, archetype: Archetype, level: u8) -> Vec<String> {
        owned(self.tier(archetype, level).map(|t| t.oracle_guidance))
    }

    /// Phase guidance candidates for a program day; empty outside `1..=60`.
    fn mastery_guidance(&self, day: u32) -> Vec<String> {
        let Some(content) = self.day(day) else {
            return Vec::new();
        };
        MASTERY_GUIDANCE
            .iter()
            .find(|(level, _)| *level == content.mastery_level)
            .map(|(_, lines)| {
                lines
                    .iter()
                    .map(|line| line.replace("{e}", content.element))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Three day-specific missions for an archetype.
    fn day_missions(&self, archetype: Archetype, day: u32) -> Vec<String>;

    fn mastery_level(&self, day: u32) -> Option<MasteryLevel> {
        self.day(day).map(|d| d.mastery_level)
    }
}

/// Levels 4 and 5 reuse the third tier.
fn tier_index(level: u8) -> Option<usize> {
    match level {
        1..=MAX_ARCHETYPE_LEVEL => Some((level.min(3) - 1) as usize),
        _ => None,
    }
}

fn owned(lines: Option<&[&str]>) -> Vec<String> {
    lines
        .unwrap_or_default()
        .iter()
        .map(|line| line.to_string())
        .collect()
}

static MASTERY_GUIDANCE: [(MasteryLevel, [&str; 3]); 5] = [
    (
        MasteryLevel::Foundation,
        [
            "FOUNDATION PHASE: You're building the bedrock of consciousness mastery. Every practice matters.",
            "Your {e} element work is creating lasting neural pathways. Trust the process.",
            "Foundation mastery unlocks advanced abilities. Stay consistent with your daily practice.",
        ],
    ),
    (
        MasteryLevel::Activation,
        [
            "ACTIVATION PHASE: Your consciousness is awakening to new possibilities. Feel the energy building.",
            "{e} activation is amplifying your natural abilities. You're becoming more powerful.",
            "The quantum field responds to your elevated frequency. Reality is becoming more malleable.",
        ],
    ),
    (
        MasteryLevel::Integration,
        [
            "INTEGRATION PHASE: You're weaving all elements into a unified field of mastery. Incredible progress.",
            "Your {e} integration is creating quantum coherence. You're approaching mastery.",
            "Multiple systems coming online simultaneously. You're becoming a force of nature.",
        ],
    ),
    (
        MasteryLevel::Mastery,
        [
            "MASTERY PHASE: You've transcended ordinary limitations. Your consciousness operates at master level.",
            "{e} mastery achieved. You now influence reality through pure intention.",
            "Few reach this level of consciousness evolution. You're becoming a teacher for others.",
        ],
    ),
    (
        MasteryLevel::Transcendence,
        [
            "TRANSCENDENCE PHASE: You've moved beyond individual evolution into service of collective awakening.",
            "Your {e} transcendence creates ripples across the quantum field.",
            "You are becoming a bridge between dimensions, serving the evolution of consciousness itself.",
        ],
    ),
];

/// Built-in catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl ContentCatalog for StaticCatalog {
    fn day(&self, day: u32) -> Option<DayContent> {
        if !(1..=PROGRAM_DAYS).contains(&day) {
            return None;
        }
        let phase = phase_table(day);
        let element = phase.elements[((day - phase.first_day) as usize) % phase.elements.len()];
        let week = day.div_ceil(7);
        let lower = element.to_lowercase();

        let quantum_upgrade = if day == PROGRAM_DAYS {
            Some("TRANSCENDENCE COMPLETE - You Are Now A Master Of Consciousness Evolution".to_string())
        } else if day % 7 == 0 {
            phase
                .upgrade_suffix
                .map(|suffix| format!("Week {} {}", week, suffix))
        } else {
            None
        };

        Some(DayContent {
            day,
            week,
            element,
            mastery_level: phase.mastery_level,
            theme: format!("{} Day {}: {} {}", phase.label, day, element, phase.theme_word),
            focus: phase.focus.replace("{e}", &lower),
            quantum_upgrade,
        })
    }

    fn profile(&self, archetype: Archetype) -> &ArchetypeProfile {
        match archetype {
            Archetype::Visionary => &VISIONARY,
            Archetype::Creator => &CREATOR,
            Archetype::Warrior => &WARRIOR,
            Archetype::Mystic => &MYSTIC,
        }
    }

    fn day_missions(&self, archetype: Archetype, day: u32) -> Vec<String> {
        if !(1..=PROGRAM_DAYS).contains(&day) {
            return Vec::new();
        }
        let phase = phase_table(day);
        let element = phase.elements[((day - phase.first_day) as usize) % phase.elements.len()];
        let templates = match archetype {
            Archetype::Visionary => phase.missions[0],
            Archetype::Creator => phase.missions[1],
            Archetype::Warrior => phase.missions[2],
            Archetype::Mystic => phase.missions[3],
        };
        templates.iter().map(|t| t.replace("{e}", element)).collect()
    }
}

// ---------------------------------------------------------------------------
// Program table
// ---------------------------------------------------------------------------

struct PhaseContent {
    first_day: u32,
    last_day: u32,
    mastery_level: MasteryLevel,
    label: &'static str,
    theme_word: &'static str,
    focus: &'static str,
    elements: &'static [&'static str],
    upgrade_suffix: Option<&'static str>,
    /// Visionary, creator, warrior, mystic.
    missions: [[&'static str; 3]; 4],
}

fn phase_table(day: u32) -> &'static PhaseContent {
    PHASES
        .iter()
        .find(|p| (p.first_day..=p.last_day).contains(&day))
        .unwrap_or(&PHASES[PHASES.len() - 1])
}

static PHASES: [PhaseContent; 5] = [
    PhaseContent {
        first_day: 1,
        last_day: 14,
        mastery_level: MasteryLevel::Foundation,
        label: "Foundation",
        theme_word: "Mastery",
        focus: "Building consciousness foundation through {e} element integration",
        elements: &["Earth", "Air", "Fire", "Water", "Ether", "Light", "Sound"],
        upgrade_suffix: Some("Foundation Complete - Activation Protocols Unlocked"),
        missions: [
            [
                "Use {e} energy to enhance your visionary abilities",
                "Practice seeing the future through {e} awareness",
                "Apply {e} wisdom to a current life challenge",
            ],
            [
                "Create something beautiful using {e} energy as inspiration",
                "Infuse a creative project with {e} consciousness",
                "Use {e} energy to breakthrough a creative block",
            ],
            [
                "Use {e} energy to overcome a significant challenge",
                "Apply {e} warrior energy to a personal goal",
                "Defend someone using {e} warrior strength",
            ],
            [
                "Deepen your spiritual practice through {e} meditation",
                "Use {e} consciousness to heal an aspect of yourself",
                "Connect with the divine through {e} communion",
            ],
        ],
    },
    PhaseContent {
        first_day: 15,
        last_day: 28,
        mastery_level: MasteryLevel::Activation,
        label: "Activation",
        theme_word: "Awakening",
        focus: "Awakening dormant consciousness abilities through {e} activation",
        elements: &["Water", "Fire", "Air", "Earth", "Ether", "Light", "Sound", "Love"],
        upgrade_suffix: Some("Activation Complete - Integration Protocols Unlocked"),
        missions: [
            [
                "Use activated {e} powers to enhance your visionary abilities",
                "Teach someone to see possibilities through {e} consciousness",
                "Apply {e} activation to solve a complex problem",
            ],
            [
                "Create something using your activated {e} powers",
                "Collaborate with others using {e} creative abilities",
                "Use {e} activation to breakthrough creative limitations",
            ],
            [
                "Use activated {e} powers to overcome a major challenge",
                "Lead others using {e} warrior activation",
                "Apply {e} activation to defend someone in need",
            ],
            [
                "Use activated {e} powers to deepen spiritual practice",
                "Facilitate healing using {e} mystical abilities",
                "Connect with higher dimensions through {e} activation",
            ],
        ],
    },
    PhaseContent {
        first_day: 29,
        last_day: 42,
        mastery_level: MasteryLevel::Integration,
        label: "Integration",
        theme_word: "Unification",
        focus: "Unifying all consciousness systems through {e} integration mastery",
        elements: &["Fire", "Ether", "Light", "Sound", "Love", "Unity", "Void", "Source"],
        upgrade_suffix: Some("Integration Complete - Mastery Protocols Unlocked"),
        missions: [
            [
                "Use unified {e} consciousness to access cosmic visions",
                "Teach others about unified consciousness through {e} mastery",
                "Apply {e} integration to solve collective challenges",
            ],
            [
                "Create masterworks using unified {e} consciousness",
                "Collaborate to create something that serves collective evolution",
                "Use {e} integration to manifest impossible beauty",
            ],
            [
                "Use unified {e} consciousness to serve justice on a larger scale",
                "Lead collective transformation using {e} integration",
                "Apply {e} mastery to liberate others from limitations",
            ],
            [
                "Use unified {e} consciousness for planetary healing",
                "Channel cosmic wisdom through {e} integration",
                "Serve as a bridge between dimensions using {e} mastery",
            ],
        ],
    },
    PhaseContent {
        first_day: 43,
        last_day: 56,
        mastery_level: MasteryLevel::Mastery,
        label: "Mastery",
        theme_word: "Transcendence",
        focus: "Transcending ordinary limitations through {e} consciousness mastery",
        elements: &[
            "Unity",
            "Void",
            "Source",
            "Infinity",
            "Eternity",
            "Omnipresence",
            "Omniscience",
            "Omnipotence",
        ],
        upgrade_suffix: Some("Mastery Complete - Transcendence Protocols Unlocked"),
        missions: [
            [
                "Use {e} mastery to channel visions for collective healing",
                "Teach others to transcend limitations through {e} consciousness",
                "Apply {e} mastery to solve impossible challenges",
            ],
            [
                "Create something that serves the evolution of consciousness",
                "Use {e} mastery to manifest collective healing",
                "Teach others to create through transcendent consciousness",
            ],
            [
                "Use {e} mastery to serve collective justice and liberation",
                "Lead others through impossible transformations",
                "Apply {e} mastery to defend consciousness evolution",
            ],
            [
                "Use {e} mastery for planetary and cosmic healing",
                "Channel cosmic wisdom for collective awakening",
                "Serve as a bridge between dimensions for all beings",
            ],
        ],
    },
    PhaseContent {
        first_day: 57,
        last_day: 60,
        mastery_level: MasteryLevel::Transcendence,
        label: "Transcendence",
        theme_word: "Unity",
        focus: "Serving collective consciousness evolution through {e} transcendence",
        elements: &["Source", "Infinity", "Eternity", "All-That-Is"],
        upgrade_suffix: None,
        missions: [
            [
                "Channel {e} visions for the awakening of all beings",
                "Serve as cosmic vision for collective consciousness evolution",
                "Help all beings see their infinite potential through {e} unity",
            ],
            [
                "Create through {e} consciousness for the benefit of all beings",
                "Serve as cosmic creativity for collective consciousness evolution",
                "Help all beings create their highest reality through {e} unity",
            ],
            [
                "Serve as {e} liberation for all beings everywhere",
                "Fight for the freedom of all consciousness through {e} unity",
                "Help all beings break free from limitation through {e} transcendence",
            ],
            [
                "Serve as {e} love for all beings everywhere",
                "Be the divine presence for collective consciousness evolution",
                "Help all beings remember their true nature through {e} unity",
            ],
        ],
    },
];

// ---------------------------------------------------------------------------
// Archetype profiles
// ---------------------------------------------------------------------------

static VISIONARY: ArchetypeProfile = ArchetypeProfile {
    archetype: Archetype::Visionary,
    name: "Visionary",
    description: "See beyond current reality and architect new possibilities",
    tiers: [
        ArchetypeTier {
            title: "Reality Perceiver",
            abilities: &["Enhanced intuition", "Pattern recognition", "Future glimpses"],
            missions: &[
                "Spend 10 minutes visualizing your ideal day in vivid detail",
                "Write down 3 'impossible' goals and feel them as already real",
                "Notice and document 2 patterns others miss today",
                "Ask 'What if?' about something everyone accepts as fixed",
            ],
            oracle_guidance: &[
                "Your third eye is awakening. Trust the visions that come.",
                "Reality is more malleable than most believe. You're beginning to see the code.",
                "The future is calling to you through synchronicities. Pay attention.",
            ],
        },
        ArchetypeTier {
            title: "Timeline Architect",
            abilities: &["Timeline shifting", "Probability manipulation", "Quantum visioning"],
            missions: &[
                "Meditate on a specific future outcome for 20 minutes",
                "Create a detailed vision board of your next reality level",
                "Practice 'future memory' - remember tomorrow as if it already happened",
                "Identify and shift one limiting belief about what's possible",
            ],
            oracle_guidance: &[
                "You're learning to navigate multiple timelines. Choose consciously.",
                "Your visions are becoming reality blueprints. Trust the process.",
                "The quantum field responds to your elevated perspective.",
            ],
        },
        ArchetypeTier {
            title: "Reality Weaver",
            abilities: &[
                "Dimensional perception",
                "Collective vision influence",
                "Manifestation mastery",
            ],
            missions: &[
                "Hold a vision for global healing for 30 minutes",
                "Teach someone else to see beyond their current limitations",
                "Create a 'reality map' showing multiple possible futures",
                "Practice bilocation meditation - be in two places at once",
            ],
            oracle_guidance: &[
                "You're becoming a bridge between dimensions. Use this power wisely.",
                "Your consciousness affects the collective field. Envision beauty.",
                "Reality bends around your focused intention. You are becoming the vision.",
            ],
        },
    ],
};

static CREATOR: ArchetypeProfile = ArchetypeProfile {
    archetype: Archetype::Creator,
    name: "Creator",
    description: "Build new worlds through inspired action and divine creativity",
    tiers: [
        ArchetypeTier {
            title: "Spark Igniter",
            abilities: &["Creative flow access", "Inspiration channeling", "Idea manifestation"],
            missions: &[
                "Create something beautiful with your hands for 15 minutes",
                "Write, draw, or build something that didn't exist this morning",
                "Share one creative idea that could help someone",
                "Transform something ordinary into something magical",
            ],
            oracle_guidance: &[
                "The universe creates through you. Let the flow move freely.",
                "Every creation ripples through reality. Make beauty.",
                "Your hands are instruments of divine expression.",
            ],
        },
        ArchetypeTier {
            title: "Reality Sculptor",
            abilities: &["Matter manipulation", "Energy crafting", "Dimensional building"],
            missions: &[
                "Spend 30 minutes in pure creative flow without judgment",
                "Build something that serves others' highest good",
                "Collaborate with someone to create something neither could alone",
                "Transform a problem into an opportunity through creative solution",
            ],
            oracle_guidance: &[
                "You're learning to sculpt reality itself. Every action is creation.",
                "The field responds to your creative frequency. Stay in flow.",
                "Your creations are becoming portals to higher dimensions.",
            ],
        },
        ArchetypeTier {
            title: "Universe Builder",
            abilities: &["World creation", "Reality architecture", "Collective manifestation"],
            missions: &[
                "Design and begin building a project that will outlast you",
                "Create something that elevates collective consciousness",
                "Teach others to access their creative power",
                "Build a bridge between the current world and the one you envision",
            ],
            oracle_guidance: &[
                "You are becoming a co-creator with the universe itself.",
                "Your creations are seeding new realities. Think beyond yourself.",
                "The cosmos flows through your creative expression. You are the universe creating.",
            ],
        },
    ],
};

static WARRIOR: ArchetypeProfile = ArchetypeProfile {
    archetype: Archetype::Warrior,
    name: "Warrior",
    description: "Conquer limitations and forge new paths through courage",
    tiers: [
        ArchetypeTier {
            title: "Fear Slayer",
            abilities: &["Courage cultivation", "Resistance breaking", "Boundary pushing"],
            missions: &[
                "Do one thing today that scares you but serves your growth",
                "Have a difficult conversation you've been avoiding",
                "Stand up for something you believe in, even if others disagree",
                "Push through a comfort zone boundary with conscious intention",
            ],
            oracle_guidance: &[
                "Fear is just energy waiting to be transformed into power.",
                "Every boundary you break expands the possible for all.",
                "Your courage creates permission for others to be brave.",
            ],
        },
        ArchetypeTier {
            title: "Limitation Destroyer",
            abilities: &["Reality breaking", "Impossible achievement", "Quantum leaping"],
            missions: &[
                "Attempt something others say is impossible for you",
                "Break a personal record or limitation you've held",
                "Defend someone who cannot defend themselves",
                "Take action on a goal that requires you to become someone new",
            ],
            oracle_guidance: &[
                "You're becoming unstoppable. Channel this power with wisdom.",
                "Limitations exist only in consciousness. You're breaking free.",
                "Your warrior spirit is awakening dormant potentials.",
            ],
        },
        ArchetypeTier {
            title: "Reality Conqueror",
            abilities: &[
                "Dimensional mastery",
                "Collective liberation",
                "Impossible manifestation",
            ],
            missions: &[
                "Lead others through a transformation they thought impossible",
                "Conquer a fear that has limited your entire family lineage",
                "Create a victory that serves the liberation of many",
                "Become living proof that 'impossible' is just an opinion",
            ],
            oracle_guidance: &[
                "You have become a force of liberation in the world.",
                "Your victories free others from their own limitations.",
                "You are becoming a liberator of consciousness itself.",
            ],
        },
    ],
};

static MYSTIC: ArchetypeProfile = ArchetypeProfile {
    archetype: Archetype::Mystic,
    name: "Mystic",
    description: "Connect with infinite intelligence and channel divine wisdom",
    tiers: [
        ArchetypeTier {
            title: "Divine Receiver",
            abilities: &["Intuitive knowing", "Energy sensing", "Spiritual connection"],
            missions: &[
                "Spend 20 minutes in silent communion with your higher self",
                "Follow your intuition completely for one important decision today",
                "Practice feeling the energy of people and places around you",
                "Ask for guidance and trust the first answer that comes",
            ],
            oracle_guidance: &[
                "The universe speaks through your intuition. Learn to listen.",
                "You are a receiver of divine transmission. Tune in.",
                "Your sensitivity is a superpower. Trust what you feel.",
            ],
        },
        ArchetypeTier {
            title: "Wisdom Channeler",
            abilities: &[
                "Divine channeling",
                "Akashic access",
                "Collective consciousness connection",
            ],
            missions: &[
                "Channel guidance for someone who needs help",
                "Access information beyond your normal knowledge through meditation",
                "Practice automatic writing or speaking from higher consciousness",
                "Serve as a bridge between someone and their own divine nature",
            ],
            oracle_guidance: &[
                "You're becoming a clear channel for divine wisdom.",
                "The collective consciousness flows through your awareness.",
                "Your connection to source is strengthening. Share the light.",
            ],
        },
        ArchetypeTier {
            title: "Cosmic Conduit",
            abilities: &[
                "Universal consciousness",
                "Reality transmission",
                "Dimensional bridging",
            ],
            missions: &[
                "Hold space for a group healing or transformation",
                "Channel wisdom that serves the evolution of consciousness",
                "Become a living bridge between dimensions",
                "Transmit love and light to heal collective wounds",
            ],
            oracle_guidance: &[
                "You have become a conduit for cosmic consciousness.",
                "Through you, the universe heals itself.",
                "Your presence alone elevates the field. You are the light.",
            ],
        },
    ],
};
