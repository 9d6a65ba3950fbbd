//! Hand-authored datasets: guide sheets, lecture videos and PhET simulations.

use super::SeedNode;
use crate::models::ResourceKind;

pub const GUIDES_SOURCE: &str = "Guide Sheets";
pub const VIDEOS_SOURCE: &str = "Video Lectures";
pub const PHET_SOURCE: &str = "PhET Simulations";

const OPENSTAX_VOL1: &str = "https://openstax.org/books/university-physics-volume-1/pages";
const OPENSTAX_VOL2: &str = "https://openstax.org/books/university-physics-volume-2/pages";
const PHET_SIMS: &str = "https://phet.colorado.edu/sims/html";

/// (chapter, title) pairs covering the AP Physics C: Mechanics units.
const MECHANICS_CHAPTERS: &[(u32, &str)] = &[
    (2, "Vectors"),
    (3, "Motion Along a Straight Line"),
    (4, "Motion in Two and Three Dimensions"),
    (5, "Newton's Laws of Motion"),
    (6, "Applications of Newton's Laws"),
    (7, "Work and Kinetic Energy"),
    (8, "Potential Energy and Conservation of Energy"),
    (9, "Linear Momentum and Collisions"),
    (10, "Fixed-Axis Rotation"),
    (11, "Angular Momentum"),
    (13, "Gravitation"),
    (15, "Oscillations"),
];

/// (chapter, title) pairs covering AP Physics C: Electricity and Magnetism.
const EM_CHAPTERS: &[(u32, &str)] = &[
    (5, "Electric Charges and Fields"),
    (6, "Gauss's Law"),
    (7, "Electric Potential"),
    (8, "Capacitance"),
    (9, "Current and Resistance"),
    (10, "Direct-Current Circuits"),
    (11, "Magnetic Forces and Fields"),
    (12, "Sources of Magnetic Fields"),
    (13, "Electromagnetic Induction"),
    (14, "Inductance"),
];

const MECHANICS_SIMS: &[(&str, &str)] = &[
    ("projectile-motion", "Projectile Motion"),
    ("forces-and-motion-basics", "Forces and Motion: Basics"),
    ("energy-skate-park", "Energy Skate Park"),
    ("pendulum-lab", "Pendulum Lab"),
    ("masses-and-springs", "Masses and Springs"),
    ("gravity-and-orbits", "Gravity And Orbits"),
];

const EM_SIMS: &[(&str, &str)] = &[
    ("charges-and-fields", "Charges and Fields"),
    ("capacitor-lab-basics", "Capacitor Lab: Basics"),
    ("circuit-construction-kit-dc", "Circuit Construction Kit: DC"),
    ("faradays-law", "Faraday's Law"),
];

pub fn guide_sheets() -> Vec<SeedNode> {
    let chapters = |base: &str, chapters: &[(u32, &str)]| -> Vec<SeedNode> {
        chapters
            .iter()
            .map(|(chapter, title)| {
                SeedNode::leaf(
                    ResourceKind::Guidesheet,
                    *title,
                    format!("{}/{}-introduction", base, chapter),
                )
            })
            .collect()
    };

    vec![SeedNode::category(
        GUIDES_SOURCE,
        vec![
            SeedNode::category("Mechanics", chapters(OPENSTAX_VOL1, MECHANICS_CHAPTERS)),
            SeedNode::category(
                "Electricity and Magnetism",
                chapters(OPENSTAX_VOL2, EM_CHAPTERS),
            ),
        ],
    )]
}

pub fn video_lectures() -> Vec<SeedNode> {
    vec![SeedNode::category(
        VIDEOS_SOURCE,
        vec![
            SeedNode::category(
                "Mechanics",
                vec![
                    SeedNode::leaf(
                        ResourceKind::Video,
                        "MIT 8.01SC Classical Mechanics",
                        "https://ocw.mit.edu/courses/8-01sc-classical-mechanics-fall-2016/",
                    ),
                    SeedNode::leaf(
                        ResourceKind::Video,
                        "Flipping Physics",
                        "https://www.youtube.com/@FlippingPhysics",
                    ),
                ],
            ),
            SeedNode::category(
                "Electricity and Magnetism",
                vec![SeedNode::leaf(
                    ResourceKind::Video,
                    "MIT 8.02 Electricity and Magnetism",
                    "https://ocw.mit.edu/courses/8-02-physics-ii-electricity-and-magnetism-spring-2007/",
                )],
            ),
            SeedNode::leaf(
                ResourceKind::Link,
                "Khan Academy Physics Library",
                "https://www.khanacademy.org/science/physics",
            ),
        ],
    )]
}

pub fn phet_simulations() -> Vec<SeedNode> {
    let sims = |sims: &[(&str, &str)]| -> Vec<SeedNode> {
        sims.iter()
            .map(|(slug, name)| {
                SeedNode::simulation(
                    *name,
                    format!("{PHET_SIMS}/{slug}/latest/{slug}_en.html"),
                    format!("{PHET_SIMS}/{slug}/latest/{slug}-600.png"),
                )
            })
            .collect()
    };

    vec![SeedNode::category(
        PHET_SOURCE,
        vec![
            SeedNode::category("Mechanics", sims(MECHANICS_SIMS)),
            SeedNode::category("Electricity and Magnetism", sims(EM_SIMS)),
        ],
    )]
}
