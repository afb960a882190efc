/// Physical constants of a damped spring.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpringConfig {
    /// Mass, `> 0`.
    pub mass: f64,
    /// Spring constant `k`, `> 0`.
    pub stiffness: f64,
    /// Damping coefficient `c`, `>= 0`.
    pub damping: f64,
}

impl SpringConfig {
    #[inline]
    pub const fn new(mass: f64, stiffness: f64, damping: f64) -> Self {
        Self { mass, stiffness, damping }
    }

    /// Near-critically damped preset for UI motion (ratio ≈ 0.997).
    #[inline]
    pub const fn gentle() -> Self {
        Self::new(1.0, 170.0, 26.0)
    }

    /// Exactly critically damped spring for the given mass and stiffness.
    pub fn critically_damped(mass: f64, stiffness: f64) -> Self {
        Self::new(mass, stiffness, 2.0 * (stiffness * mass).sqrt())
    }

    /// `c / (2 sqrt(k m))`: 1 is critical, below oscillates, above creeps.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Longest `dt` that [`SpringAnimator::step`] integrates in one update.
    ///
    /// `min(2 sqrt(m / k), 2 m / c)`: past either bound a single
    /// semi-implicit step overshoots so far that repeated steps diverge.
    /// Any dt the frame loop can produce (at most `MAX_FRAME_DT`) is below
    /// this for the presets.
    pub fn single_step_limit(&self) -> f64 {
        let natural = 2.0 * (self.mass / self.stiffness).sqrt();
        let damped = if self.damping > 0.0 {
            2.0 * self.mass / self.damping
        } else {
            f64::INFINITY
        };
        natural.min(damped)
    }

    /// Sub-step used once a dt exceeds [`Self::single_step_limit`].
    fn substep(&self) -> f64 {
        0.25 * self.single_step_limit()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::gentle()
    }
}

/// Cap on sub-steps for one oversized dt.
///
/// Only reached by a dt hundreds of times the single-step limit; the spring
/// then advances `MAX_SUBSTEPS` sub-steps, by which point it has long settled.
const MAX_SUBSTEPS: u32 = 1024;

/// Damped-oscillator integrator for one animated value.
///
/// ```text
/// a  = (k (target - x) - c v) / m
/// v += a dt
/// x += v dt
/// ```
///
/// Velocity is updated first (semi-implicit Euler), which keeps the energy of
/// an undamped spring bounded under fixed steps where explicit Euler would
/// grow it every step.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringAnimator {
    config: SpringConfig,
    position: f64,
    velocity: f64,
    target: f64,
}

impl SpringAnimator {
    pub fn new(mass: f64, stiffness: f64, damping: f64, position: f64, target: f64) -> Self {
        Self::with_config(SpringConfig::new(mass, stiffness, damping), position, target)
    }

    pub fn with_config(config: SpringConfig, position: f64, target: f64) -> Self {
        debug_assert!(config.mass > 0.0, "spring mass must be positive");
        debug_assert!(config.stiffness > 0.0, "spring stiffness must be positive");
        debug_assert!(config.damping >= 0.0, "spring damping must be non-negative");

        let config = SpringConfig {
            mass: config.mass.max(f64::EPSILON),
            stiffness: config.stiffness.max(f64::EPSILON),
            damping: config.damping.max(0.0),
        };

        Self {
            config,
            position,
            velocity: 0.0,
            target,
        }
    }

    #[inline]
    pub fn config(&self) -> SpringConfig {
        self.config
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Retargets the animation. Position and velocity carry over unchanged.
    #[inline]
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Jumps to the target and stops.
    pub fn snap_to_target(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
    }

    /// Integrates `dt` seconds and returns the new position.
    ///
    /// One semi-implicit Euler update when `dt` is within
    /// [`SpringConfig::single_step_limit`]. Keeping dt that small is the
    /// caller's job; a larger dt is split into sub-steps so the state stays
    /// finite anyway. Negative or non-finite `dt` is treated as zero.
    pub fn step(&mut self, dt: f64) -> f64 {
        if !dt.is_finite() || dt <= 0.0 {
            return self.position;
        }

        if dt <= self.config.single_step_limit() {
            self.integrate(dt);
            return self.position;
        }

        let h_max = self.config.substep();
        let wanted = (dt / h_max).ceil();
        let (substeps, h) = if wanted <= MAX_SUBSTEPS as f64 {
            (wanted as u32, dt / wanted)
        } else {
            (MAX_SUBSTEPS, h_max)
        };

        log::trace!("spring dt {dt:.4}s split into {substeps} sub-steps");
        for _ in 0..substeps {
            self.integrate(h);
        }
        self.position
    }

    fn integrate(&mut self, h: f64) {
        let SpringConfig { mass, stiffness, damping } = self.config;
        let acceleration =
            (stiffness * (self.target - self.position) - damping * self.velocity) / mass;
        self.velocity += acceleration * h;
        self.position += self.velocity * h;
    }

    /// True once both the remaining distance and the speed are below `epsilon`.
    #[inline]
    pub fn is_settled(&self, epsilon: f64) -> bool {
        (self.target - self.position).abs() < epsilon && self.velocity.abs() < epsilon
    }
}
