use chrono::{Days, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..bound`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    /// One-in-`denominator` chance.
    fn one_in(&mut self, denominator: u64) -> bool {
        self.below(denominator) == 0
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

const SOURCE_SYSTEMS: [&str; 3] = ["Guidewire", "Legacy", "Partner API"];
const NATURES_OF_LOSS: [&str; 6] = [
    "Collision",
    "Hail",
    "Theft",
    "Fire",
    "Water Damage",
    "Storm",
];
const LINES_OF_BUSINESS: [&str; 5] = [
    "Motor",
    "Home",
    "Commercial Property",
    "Liability",
    "Marine",
];
const STATUSES: [&str; 4] = ["Open", "Closed", "Reopened", "Withdrawn"];
const FAULT_RATINGS: [&str; 3] = ["At Fault", "Not At Fault", "Split Liability"];
const FAULT_CATEGORIES: [&str; 4] = [
    "Driver Error",
    "Weather Event",
    "Third Party",
    "Undetermined",
];
const CITIES: [&str; 6] = [
    "Sydney",
    "Melbourne",
    "Brisbane",
    "Perth",
    "Adelaide",
    "Hobart",
];
const FIRST_NAMES: [&str; 6] = ["Dana", "Lee", "Priya", "Marcus", "Ines", "Tom"];
const LAST_NAMES: [&str; 6] = ["Reid", "Okafor", "Nair", "Webb", "Costa", "Larsen"];

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date-time cell with a synthetic time-of-day, as the source systems emit
/// for the `*_time` columns. The loader drops the time part.
fn iso_time(date: NaiveDate, rng: &mut SimpleRng) -> String {
    format!(
        "{} {:02}:{:02}:00",
        date.format("%Y-%m-%d"),
        rng.below(24),
        rng.below(60)
    )
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let origin = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid origin date");

    let output_path = "Claims.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record([
            "claim_number",
            "source_system",
            "general_nature_of_loss",
            "line_of_business",
            "claim_status",
            "fault_rating",
            "fault_categorisation",
            "claim_received_date",
            "claim_loss_date",
            "claim_finalised_date",
            "original_verified_date_of_loss_time",
            "last_verified_date_of_loss_time",
            "catastrophe_valid_from_date_time",
            "catastrophe_valid_to_date_time",
            "update_date",
            "loss_location_city",
            "claim_owner_first_name",
            "claim_owner_last_name",
        ])
        .expect("Failed to write header");

    let n_rows = 600;
    let mut claim_seq = 100_000u64;
    let mut last_claim_number = String::new();

    for _ in 0..n_rows {
        // Roughly one row in twelve repeats the previous claim number, so
        // distinct counts differ from row counts.
        let claim_number = if !last_claim_number.is_empty() && rng.one_in(12) {
            last_claim_number.clone()
        } else {
            claim_seq += 1 + rng.below(3);
            format!("CLM-{claim_seq}")
        };
        last_claim_number = claim_number.clone();

        let status = rng.pick(&STATUSES);

        let received = origin + Days::new(rng.below(730));
        let loss = received - Days::new(rng.below(22));
        let finalised = if status == "Closed" {
            Some(received + Days::new(10 + rng.below(110)))
        } else {
            None
        };
        let update = finalised.unwrap_or(received) + Days::new(rng.below(30));

        // Verification timestamps trail the loss date and are sometimes
        // never captured.
        let original_verified = (!rng.one_in(10)).then(|| loss + Days::new(rng.below(5)));
        let last_verified = original_verified.map(|d| d + Days::new(rng.below(10)));

        // Only catastrophe-linked claims carry a validity window.
        let (cat_from, cat_to) = if rng.one_in(7) {
            (
                Some(loss - Days::new(2)),
                Some(loss + Days::new(14)),
            )
        } else {
            (None, None)
        };

        let fault_rating = (!rng.one_in(8)).then(|| rng.pick(&FAULT_RATINGS));
        let fault_category = (!rng.one_in(8)).then(|| rng.pick(&FAULT_CATEGORIES));

        let opt_time =
            |value: Option<NaiveDate>, rng: &mut SimpleRng| match value {
                Some(d) => iso_time(d, rng),
                None => String::new(),
            };

        let record = [
            claim_number.clone(),
            rng.pick(&SOURCE_SYSTEMS).to_string(),
            rng.pick(&NATURES_OF_LOSS).to_string(),
            rng.pick(&LINES_OF_BUSINESS).to_string(),
            status.to_string(),
            fault_rating.unwrap_or("").to_string(),
            fault_category.unwrap_or("").to_string(),
            iso(received),
            iso(loss),
            finalised.map(iso).unwrap_or_default(),
            opt_time(original_verified, &mut rng),
            opt_time(last_verified, &mut rng),
            opt_time(cat_from, &mut rng),
            opt_time(cat_to, &mut rng),
            iso(update),
            rng.pick(&CITIES).to_string(),
            rng.pick(&FIRST_NAMES).to_string(),
            rng.pick(&LAST_NAMES).to_string(),
        ];
        writer.write_record(&record).expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_rows} claim records to {output_path}");
}
