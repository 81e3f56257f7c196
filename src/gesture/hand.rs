/// Finger counting and hand-sign heuristics on MediaPipe hand landmarks.
use crate::core::config::HandThresholds;
use crate::core::landmarks::{Hand, HandLandmark as L};

/// Tip/PIP pairs for the four long fingers, index to pinky.
const FINGERS: [(L, L); 4] =
    [(L::IndexTip, L::IndexPip), (L::MiddleTip, L::MiddlePip), (L::RingTip, L::RingPip), (L::PinkyTip, L::PinkyPip)];

/// Which fingers are extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fingers {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl Fingers {
    pub fn count(&self) -> u8 {
        [self.thumb, self.index, self.middle, self.ring, self.pinky].iter().filter(|up| **up).count() as u8
    }
}

/// Thumb counts when its tip is past the IP joint sideways, other fingers when the tip is above the PIP.
pub fn extended_fingers(hand: &Hand) -> Fingers {
    let up = |(tip, pip): (L, L)| hand.kp(tip).y < hand.kp(pip).y;
    Fingers {
        thumb: hand.kp(L::ThumbTip).x < hand.kp(L::ThumbIp).x,
        index: up(FINGERS[0]),
        middle: up(FINGERS[1]),
        ring: up(FINGERS[2]),
        pinky: up(FINGERS[3]),
    }
}

pub fn count_fingers(hand: &Hand) -> u8 {
    extended_fingers(hand).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandShape {
    Fist,
    OpenHand,
    Fingers(u8),
}

pub fn hand_shape(hand: &Hand) -> HandShape {
    match count_fingers(hand) {
        0 => HandShape::Fist,
        5 => HandShape::OpenHand,
        n => HandShape::Fingers(n),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    pub const ALL: [Throw; 3] = [Throw::Rock, Throw::Paper, Throw::Scissors];

    pub fn beats(self, other: Throw) -> bool {
        matches!(
            (self, other),
            (Throw::Rock, Throw::Scissors) | (Throw::Paper, Throw::Rock) | (Throw::Scissors, Throw::Paper)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Throw::Rock => "ROCK",
            Throw::Paper => "PAPER",
            Throw::Scissors => "SCISSORS",
        }
    }
}

/// 0 fingers rock, 5 paper, 2 scissors.
pub fn rps_throw(hand: &Hand) -> Option<Throw> {
    match count_fingers(hand) {
        0 => Some(Throw::Rock),
        5 => Some(Throw::Paper),
        2 => Some(Throw::Scissors),
        _ => None,
    }
}

/// Signs used by the memory game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandSign {
    ThumbsUp,
    Peace,
    Ok,
    Rock,
    OpenHand,
}

impl HandSign {
    pub const ALL: [HandSign; 5] = [HandSign::ThumbsUp, HandSign::Peace, HandSign::Ok, HandSign::Rock, HandSign::OpenHand];

    pub fn name(self) -> &'static str {
        match self {
            HandSign::ThumbsUp => "THUMBS UP",
            HandSign::Peace => "PEACE",
            HandSign::Ok => "OK",
            HandSign::Rock => "ROCK ON",
            HandSign::OpenHand => "OPEN HAND",
        }
    }
}

/// Checks are ordered; the first that matches wins.
pub fn hand_sign(hand: &Hand, th: &HandThresholds) -> Option<HandSign> {
    let f = extended_fingers(hand);
    let count = f.count();
    if count == 5 {
        return Some(HandSign::OpenHand);
    }
    if count == 2 && f.index && f.middle && !f.ring {
        return Some(HandSign::Peace);
    }
    if f.index && f.pinky && !f.middle && !f.ring {
        return Some(HandSign::Rock);
    }
    let pinch = hand.kp(L::ThumbTip).xy().distance(hand.kp(L::IndexTip).xy());
    if pinch < th.ok_pinch && count >= 3 {
        return Some(HandSign::Ok);
    }
    if count == 1 && hand.kp(L::ThumbTip).y < hand.kp(L::ThumbIp).y {
        return Some(HandSign::ThumbsUp);
    }
    None
}

/// At least three long fingers curled, tips at or below the middle joint.
pub fn is_fist(hand: &Hand) -> bool {
    FINGERS.iter().filter(|(tip, pip)| hand.kp(*tip).y >= hand.kp(*pip).y).count() >= 3
}

/// Index raised with the middle finger folded below the index knuckle.
pub fn is_drawing(hand: &Hand) -> bool {
    let index_pip = hand.kp(L::IndexPip).y;
    hand.kp(L::IndexTip).y < index_pip && hand.kp(L::MiddleTip).y > index_pip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vec2;
    use crate::gesture::synthetic::{hand, HandPreset};

    fn preset(p: HandPreset) -> Hand {
        hand(p, L::Wrist, Vec2::new(0.5, 0.7), 0.2)
    }

    #[test]
    fn open_hand_counts_five() {
        let h = preset(HandPreset::OpenHand);
        assert_eq!(count_fingers(&h), 5);
        assert_eq!(hand_shape(&h), HandShape::OpenHand);
        assert!(!is_fist(&h));
    }

    #[test]
    fn fist_counts_zero() {
        let h = preset(HandPreset::Fist);
        assert_eq!(count_fingers(&h), 0);
        assert_eq!(hand_shape(&h), HandShape::Fist);
        assert!(is_fist(&h));
    }

    #[test]
    fn memory_signs_are_recognized() {
        let th = HandThresholds::default();
        for sign in HandSign::ALL {
            let h = preset(HandPreset::Sign(sign));
            assert_eq!(hand_sign(&h, &th), Some(sign), "{sign:?}");
        }
        assert_eq!(hand_sign(&preset(HandPreset::Fist), &th), None);
    }

    #[test]
    fn rps_throws() {
        assert_eq!(rps_throw(&preset(HandPreset::Fist)), Some(Throw::Rock));
        assert_eq!(rps_throw(&preset(HandPreset::OpenHand)), Some(Throw::Paper));
        assert_eq!(rps_throw(&preset(HandPreset::Sign(HandSign::Peace))), Some(Throw::Scissors));
        assert_eq!(rps_throw(&preset(HandPreset::Point)), None);
        assert!(Throw::Paper.beats(Throw::Rock));
        assert!(!Throw::Rock.beats(Throw::Paper));
    }

    #[test]
    fn pointing_draws() {
        assert!(is_drawing(&preset(HandPreset::Point)));
        assert!(!is_drawing(&preset(HandPreset::OpenHand)));
    }
}
