/// Guide outlines traced over the canvas.
use crate::core::geometry::Vec2;

/// Walls, then the roof, as offsets from the center.
const HOUSE: [(f32, f32); 7] =
    [(-150.0, -50.0), (-150.0, 150.0), (150.0, 150.0), (150.0, -50.0), (-150.0, -50.0), (0.0, -180.0), (150.0, -50.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Heart,
    Star,
    House,
    Flower,
    Sun,
    Butterfly,
    Tree,
    Rainbow,
}

impl Template {
    pub const ALL: [Template; 8] = [
        Template::Heart,
        Template::Star,
        Template::House,
        Template::Flower,
        Template::Sun,
        Template::Butterfly,
        Template::Tree,
        Template::Rainbow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::Heart => "Heart",
            Template::Star => "Star",
            Template::House => "House",
            Template::Flower => "Flower",
            Template::Sun => "Sun",
            Template::Butterfly => "Butterfly",
            Template::Tree => "Tree",
            Template::Rainbow => "Rainbow",
        }
    }

    /// Polylines of the outline centered on `c`. Each inner list is drawn as connected segments.
    pub fn outline(self, c: Vec2) -> Vec<Vec<Vec2>> {
        let polar = |center: Vec2, r: f32, deg: f32| {
            let a = deg.to_radians();
            Vec2::new(center.x + r * a.cos(), center.y + r * a.sin())
        };
        let ring = |center: Vec2, r: f32, step: usize| -> Vec<Vec2> {
            (0..=360).step_by(step).map(|t| polar(center, r, t as f32)).collect()
        };
        match self {
            Template::Heart => {
                let scale = 12.0;
                vec![(0..=360)
                    .step_by(2)
                    .map(|t| {
                        let a = (t as f32).to_radians();
                        Vec2::new(
                            c.x + scale * 16.0 * a.sin().powi(3),
                            c.y - scale
                                * (13.0 * a.cos() - 5.0 * (2.0 * a).cos() - 2.0 * (3.0 * a).cos() - (4.0 * a).cos()),
                        )
                    })
                    .collect()]
            }
            Template::Star => vec![(0..11)
                .map(|i| {
                    let r = if i % 2 == 0 { 200.0 } else { 80.0 };
                    polar(c, r, i as f32 * 36.0 - 90.0)
                })
                .collect()],
            Template::House => vec![HOUSE.iter().map(|(dx, dy)| Vec2::new(c.x + dx, c.y + dy)).collect()],
            Template::Flower => {
                let mut lines: Vec<Vec<Vec2>> = (0..6)
                    .map(|i| {
                        let base = i as f32 * 60.0;
                        (0..=180)
                            .step_by(10)
                            .map(|t| {
                                let petal = (t as f32).to_radians();
                                let r = 120.0 + 80.0 * petal.sin();
                                polar(c, r, base + t as f32 / 2.0)
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
                lines.push(ring(c, 40.0, 10));
                lines
            }
            Template::Sun => {
                let mut lines = vec![ring(c, 100.0, 10)];
                lines.extend((0..12).map(|i| {
                    let deg = i as f32 * 30.0;
                    vec![polar(c, 100.0, deg), polar(c, 180.0, deg)]
                }));
                lines
            }
            Template::Butterfly => [-1.0f32, 1.0]
                .into_iter()
                .map(|side| {
                    (0..=360)
                        .step_by(5)
                        .map(|t| {
                            let a = (t as f32).to_radians();
                            let r = 100.0 * (1.0 + 0.5 * (2.0 * a).sin());
                            Vec2::new(c.x + side * r * a.cos(), c.y + 150.0 * a.sin())
                        })
                        .collect::<Vec<_>>()
                })
                .collect(),
            Template::Tree => vec![
                vec![Vec2::new(c.x, c.y + 150.0), Vec2::new(c.x, c.y + 70.0)],
                ring(Vec2::new(c.x, c.y - 50.0), 120.0, 10),
            ],
            Template::Rainbow => (0..6)
                .map(|arc| {
                    let r = 200.0 - arc as f32 * 25.0;
                    (0..=180).step_by(5).map(|t| polar(Vec2::new(c.x, c.y + 100.0), r, 180.0 + t as f32)).collect::<Vec<_>>()
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_an_outline_near_the_center() {
        let c = Vec2::new(610.0, 465.0);
        for template in Template::ALL {
            let lines = template.outline(c);
            assert!(!lines.is_empty(), "{}", template.name());
            for point in lines.iter().flatten() {
                assert!(point.distance(c) < 400.0, "{} strays to {point:?}", template.name());
            }
        }
    }

    #[test]
    fn rainbow_arcs_rise_above_the_baseline() {
        let c = Vec2::new(0.0, 0.0);
        for arc in Template::Rainbow.outline(c) {
            assert!(arc.iter().all(|p| p.y <= 100.0 + 1e-3));
        }
    }
}
