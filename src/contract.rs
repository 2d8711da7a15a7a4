//! Time-boxed delivery contracts drawn from a fixed template catalog.

use rand::Rng;

use crate::resource::ResourceKind;
use crate::tick::DAY_LENGTH;

struct Template {
    kind: ResourceKind,
    min_amount: u32,
    max_amount: u32,
    min_reward: u32,
    max_reward: u32,
}

const fn template(
    kind: ResourceKind,
    min_amount: u32,
    max_amount: u32,
    min_reward: u32,
    max_reward: u32,
) -> Template {
    Template {
        kind,
        min_amount,
        max_amount,
        min_reward,
        max_reward,
    }
}

const TEMPLATES: [Template; 16] = [
    // Farming
    template(ResourceKind::Wheat, 50, 200, 50, 200),
    template(ResourceKind::Carrot, 40, 150, 60, 180),
    template(ResourceKind::Potato, 40, 150, 55, 170),
    template(ResourceKind::Beetroot, 30, 100, 75, 200),
    // Mining
    template(ResourceKind::Stone, 100, 500, 30, 150),
    template(ResourceKind::Coal, 30, 100, 60, 180),
    template(ResourceKind::Iron, 20, 80, 100, 300),
    template(ResourceKind::Gold, 10, 40, 150, 400),
    template(ResourceKind::Diamond, 5, 20, 300, 800),
    // Lumber
    template(ResourceKind::Log, 50, 200, 40, 160),
    template(ResourceKind::Planks, 100, 400, 25, 100),
    template(ResourceKind::Stick, 150, 500, 15, 60),
    // Ranching
    template(ResourceKind::Leather, 20, 80, 80, 250),
    template(ResourceKind::Beef, 30, 100, 70, 200),
    template(ResourceKind::Wool, 40, 120, 50, 150),
    template(ResourceKind::Egg, 30, 100, 40, 120),
];

/// A delivery order: fill `requested` units of `kind` before `expires_at`
/// for a coin reward. Completion is monotonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub(crate) id: u64,
    pub(crate) kind: ResourceKind,
    pub(crate) requested: u32,
    pub(crate) reward: u32,
    pub(crate) delivered: u32,
    pub(crate) completed: bool,
    pub(crate) expires_at: u64,
}

impl Contract {
    /// Draw a random contract from the catalog. Rewards scale with how
    /// far above the template minimum the requested amount landed.
    pub fn generate(id: u64, rng: &mut impl Rng, now: u64) -> Self {
        let template = &TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
        let requested = rng.gen_range(template.min_amount..=template.max_amount);
        let base_reward = rng.gen_range(template.min_reward..=template.max_reward);
        let scale = f64::from(requested) / f64::from(template.min_amount);
        let reward = (f64::from(base_reward) * scale) as u32;
        Self {
            id,
            kind: template.kind,
            requested,
            reward,
            delivered: 0,
            completed: false,
            expires_at: now + DAY_LENGTH,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn reward(&self) -> u32 {
        self.reward
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    pub fn remaining(&self) -> u32 {
        self.requested.saturating_sub(self.delivered)
    }

    pub fn progress(&self) -> f32 {
        self.delivered as f32 / self.requested as f32
    }

    /// Accept up to the remaining need; excess is rejected, not absorbed.
    /// Returns the amount accepted (0 once completed).
    pub fn deliver(&mut self, amount: u32) -> u32 {
        if self.completed {
            return 0;
        }
        let accepted = amount.min(self.remaining());
        self.delivered += accepted;
        if self.delivered >= self.requested {
            self.completed = true;
        }
        accepted
    }
}
