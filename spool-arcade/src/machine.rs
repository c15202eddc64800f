//! The raw `dodge` machine.
use crate::DodgeAction;
use strum::IntoEnumIterator;

/// Number of debris slots. A spawn is skipped when every slot is in flight.
const MAX_DEBRIS: usize = 16;

/// Half-width of the paddle. The paddle spans `2 * PADDLE_HALF + 1` pixels.
const PADDLE_HALF: usize = 3;

/// Horizontal paddle movement per frame.
const PADDLE_SPEED: usize = 2;

/// Frames between spawns at the start of an episode.
const INITIAL_SPAWN_PERIOD: u32 = 24;

/// The spawn period never ramps below this.
const MIN_SPAWN_PERIOD: u32 = 4;

/// The spawn period shortens by one every this many frames of an episode.
const SPAWN_RAMP_FRAMES: u32 = 256;

/// Size of the machine RAM in bytes.
const RAM_SIZE: usize = 128;

#[derive(Clone, Copy, Debug, Default)]
struct Debris {
    active: bool,
    x: usize,
    y: usize,
    speed: u8,
}

/// A minimal falling-debris game with an emulator-style interface.
///
/// The screen is a grayscale `width * height` buffer. The paddle occupies the
/// bottom row and moves two pixels per frame. Debris spawns on
/// the top row at a random column with a random speed of 1 to 3 pixels per
/// frame, and spawns get more frequent as the episode goes on. A piece that
/// reaches the bottom row scores +1 if it misses the paddle and -1, ending
/// the episode, if it lands on it. Episodes are also cut off after a fixed
/// number of frames, so they always end.
///
/// The machine owns its random number generator, seeded once at construction.
/// [`reset`](DodgeMachine::reset) restarts the episode without reseeding, so
/// consecutive episodes differ while the whole run stays a pure function of
/// the seed.
pub struct DodgeMachine {
    width: usize,
    height: usize,
    rng: fastrand::Rng,
    paddle_x: usize,
    debris: [Debris; MAX_DEBRIS],
    episode_frame: u32,
    total_frame: u32,
    score: i32,
    spawn_clock: u32,
    terminal: bool,
    last_action: DodgeAction,
    max_episode_frames: u32,
}

impl DodgeMachine {
    /// Creates a machine with the given screen size and seed.
    ///
    /// Panics unless `8 <= width <= 255` and `4 <= height <= 255`. The upper
    /// bound keeps every coordinate representable in one RAM byte.
    pub fn new(height: usize, width: usize, max_episode_frames: u32, seed: u64) -> Self {
        assert!(
            (8..=255).contains(&width) && (4..=255).contains(&height),
            "screen size {}x{} out of range",
            width,
            height
        );
        let mut machine = Self {
            width,
            height,
            rng: fastrand::Rng::with_seed(seed),
            paddle_x: 0,
            debris: [Debris::default(); MAX_DEBRIS],
            episode_frame: 0,
            total_frame: 0,
            score: 0,
            spawn_clock: 0,
            terminal: false,
            last_action: DodgeAction::Noop,
            max_episode_frames,
        };
        machine.reset();
        machine
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn available_actions(&self) -> Vec<DodgeAction> {
        DodgeAction::iter().collect()
    }

    pub fn is_game_over(&self) -> bool {
        self.terminal
    }

    /// Frames played in the current episode.
    pub fn episode_frame_number(&self) -> u32 {
        self.episode_frame
    }

    /// Frames played since the machine was created.
    pub fn total_frame_number(&self) -> u32 {
        self.total_frame
    }

    /// Score of the current episode.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Restarts the episode.
    ///
    /// The frame counter across episodes and the random number generator
    /// carry over, so the next episode plays out differently.
    pub fn reset(&mut self) {
        self.paddle_x = self.width / 2;
        self.debris = [Debris::default(); MAX_DEBRIS];
        self.episode_frame = 0;
        self.score = 0;
        self.spawn_clock = 0;
        self.terminal = false;
        self.last_action = DodgeAction::Noop;
    }

    /// Advances the game by one frame and returns the reward of that frame.
    ///
    /// Does nothing and returns 0 once the game is over.
    pub fn step(&mut self, action: DodgeAction) -> i32 {
        if self.terminal {
            return 0;
        }
        self.episode_frame += 1;
        self.total_frame += 1;
        self.last_action = action;

        match action {
            DodgeAction::Noop => {}
            DodgeAction::Left => {
                self.paddle_x = self.paddle_x.saturating_sub(PADDLE_SPEED).max(PADDLE_HALF);
            }
            DodgeAction::Right => {
                self.paddle_x = (self.paddle_x + PADDLE_SPEED).min(self.width - 1 - PADDLE_HALF);
            }
        }

        if self.spawn_clock == 0 {
            self.spawn_debris();
            self.spawn_clock = self.spawn_period();
        } else {
            self.spawn_clock -= 1;
        }

        let paddle_x = self.paddle_x;
        let floor = self.height - 1;
        let mut reward = 0;
        let mut hit = false;
        for d in self.debris.iter_mut() {
            if !d.active {
                continue;
            }
            d.y += d.speed as usize;
            if d.y >= floor {
                d.active = false;
                if paddle_x.abs_diff(d.x) <= PADDLE_HALF {
                    reward -= 1;
                    hit = true;
                } else {
                    reward += 1;
                }
            }
        }
        if hit || self.episode_frame >= self.max_episode_frames {
            self.terminal = true;
        }
        self.score += reward;

        reward
    }

    fn spawn_period(&self) -> u32 {
        INITIAL_SPAWN_PERIOD
            .saturating_sub(self.episode_frame / SPAWN_RAMP_FRAMES)
            .max(MIN_SPAWN_PERIOD)
    }

    fn spawn_debris(&mut self) {
        let x = self.rng.usize(..self.width);
        let speed = self.rng.u8(1..4);
        if let Some(d) = self.debris.iter_mut().find(|d| !d.active) {
            *d = Debris {
                active: true,
                x,
                y: 0,
                speed,
            };
        }
    }

    pub fn frame_size(&self) -> usize {
        self.width * self.height
    }

    /// Renders the screen into `buf` as one byte per pixel.
    ///
    /// The background is 0, the paddle 255 and debris `128 + 32 * speed`.
    pub fn render_frame(&self, buf: &mut [u8]) {
        assert_eq!(buf.len(), self.frame_size(), "frame buffer length mismatch");
        buf.fill(0);
        for d in self.debris.iter().filter(|d| d.active) {
            buf[d.y * self.width + d.x] = 128 + 32 * d.speed;
        }
        let row = (self.height - 1) * self.width;
        for x in self.paddle_x - PADDLE_HALF..=self.paddle_x + PADDLE_HALF {
            buf[row + x] = 255;
        }
    }

    pub fn ram_size(&self) -> usize {
        RAM_SIZE
    }

    /// Renders the machine state into `buf` as 128 bytes.
    ///
    /// Layout, all integers little-endian:
    ///
    /// | bytes    | content                                        |
    /// |----------|------------------------------------------------|
    /// | 0..4     | episode frame counter                          |
    /// | 4..8     | total frame counter                            |
    /// | 8..10    | score, saturated to `i16`                      |
    /// | 10       | paddle center column                           |
    /// | 11       | last action                                    |
    /// | 12       | current spawn period                           |
    /// | 13       | spawn countdown                                |
    /// | 14       | active debris count                            |
    /// | 15       | game over flag                                 |
    /// | 16..80   | debris table, 16 entries of (active, x, y, speed) |
    /// | 80..128  | zero                                           |
    pub fn render_ram(&self, buf: &mut [u8]) {
        assert_eq!(buf.len(), RAM_SIZE, "ram buffer length mismatch");
        buf.fill(0);
        buf[0..4].copy_from_slice(&self.episode_frame.to_le_bytes());
        buf[4..8].copy_from_slice(&self.total_frame.to_le_bytes());
        let score = self.score.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        buf[8..10].copy_from_slice(&score.to_le_bytes());
        buf[10] = self.paddle_x as u8;
        buf[11] = self.last_action as u8;
        buf[12] = self.spawn_period().min(255) as u8;
        buf[13] = self.spawn_clock.min(255) as u8;
        buf[14] = self.debris.iter().filter(|d| d.active).count() as u8;
        buf[15] = self.terminal as u8;
        for (i, d) in self.debris.iter().enumerate() {
            let o = 16 + 4 * i;
            buf[o] = d.active as u8;
            buf[o + 1] = d.x as u8;
            buf[o + 2] = d.y.min(255) as u8;
            buf[o + 3] = d.speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(m: &DodgeMachine) -> Vec<u8> {
        let mut buf = vec![0; m.frame_size()];
        m.render_frame(&mut buf);
        buf
    }

    fn ram_of(m: &DodgeMachine) -> Vec<u8> {
        let mut buf = vec![0; m.ram_size()];
        m.render_ram(&mut buf);
        buf
    }

    #[test]
    fn same_seed_gives_the_same_rollout() {
        let mut a = DodgeMachine::new(24, 32, 400, 7);
        let mut b = DodgeMachine::new(24, 32, 400, 7);
        let actions = [DodgeAction::Left, DodgeAction::Noop, DodgeAction::Right];

        for i in 0..200 {
            let act = actions[i % actions.len()];
            assert_eq!(a.step(act), b.step(act));
            assert_eq!(frame_of(&a), frame_of(&b));
            assert_eq!(ram_of(&a), ram_of(&b));
        }
    }

    #[test]
    fn episodes_always_end() {
        let mut m = DodgeMachine::new(24, 32, 400, 7);
        while !m.is_game_over() {
            m.step(DodgeAction::Noop);
        }
        assert!(m.episode_frame_number() <= 400);
    }

    #[test]
    fn reset_restarts_the_episode_but_not_the_run() {
        let mut m = DodgeMachine::new(24, 32, 400, 7);
        while !m.is_game_over() {
            m.step(DodgeAction::Noop);
        }
        let played = m.total_frame_number();
        assert!(played > 0);

        m.reset();
        assert!(!m.is_game_over());
        assert_eq!(m.episode_frame_number(), 0);
        assert_eq!(m.score(), 0);
        assert_eq!(m.total_frame_number(), played);
        // No debris in flight right after a reset.
        assert_eq!(ram_of(&m)[14], 0);
    }

    #[test]
    fn paddle_stops_at_the_left_edge() {
        let mut m = DodgeMachine::new(24, 32, 400, 7);
        // The first debris needs at least 8 frames to reach the floor, so
        // these steps cannot end the episode.
        for _ in 0..7 {
            m.step(DodgeAction::Left);
        }

        let frame = frame_of(&m);
        let bottom = &frame[23 * 32..];
        for (x, &pixel) in bottom.iter().enumerate() {
            let expected = if x <= 2 * PADDLE_HALF { 255 } else { 0 };
            assert_eq!(pixel, expected, "pixel {} of the bottom row", x);
        }
    }

    #[test]
    fn ram_reflects_counters_and_actions() {
        let mut m = DodgeMachine::new(24, 32, 400, 7);
        m.step(DodgeAction::Left);
        m.step(DodgeAction::Left);
        m.step(DodgeAction::Right);

        let ram = ram_of(&m);
        assert_eq!(u32::from_le_bytes([ram[0], ram[1], ram[2], ram[3]]), 3);
        assert_eq!(u32::from_le_bytes([ram[4], ram[5], ram[6], ram[7]]), 3);
        assert_eq!(ram[11], DodgeAction::Right as u8);
        // The debris spawned on the first frame is still in flight.
        assert!(ram[14] >= 1);
        assert_eq!(ram[15], 0);
    }

    #[test]
    fn score_accumulates_frame_rewards() {
        let mut m = DodgeMachine::new(24, 32, 400, 7);
        let mut sum = 0;
        while !m.is_game_over() {
            sum += m.step(DodgeAction::Noop);
        }
        assert_eq!(m.score(), sum);

        let ram = ram_of(&m);
        assert_eq!(i16::from_le_bytes([ram[8], ram[9]]) as i32, sum);
        assert_eq!(ram[15], 1);
    }

    #[test]
    fn stepping_a_finished_game_is_a_no_op() {
        let mut m = DodgeMachine::new(24, 32, 1, 7);
        m.step(DodgeAction::Noop);
        assert!(m.is_game_over());

        let before = ram_of(&m);
        assert_eq!(m.step(DodgeAction::Left), 0);
        assert_eq!(ram_of(&m), before);
    }

    #[test]
    #[should_panic(expected = "screen size")]
    fn tiny_screens_are_rejected() {
        let _ = DodgeMachine::new(24, 4, 400, 7);
    }
}
