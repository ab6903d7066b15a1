use conquest_protocol::{CityId, CitySnapshot, Hex, PlayerId, UnitKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub position: Hex,
    pub owner: Option<PlayerId>,
    /// Production points added per turn.
    pub production_capacity: i32,
    pub current_production: Option<UnitKind>,
    /// Accumulated points toward `current_production`; zero while idle.
    pub production_progress: i32,
}

impl City {
    pub fn new(
        id: CityId,
        name: String,
        position: Hex,
        owner: Option<PlayerId>,
        production_capacity: i32,
    ) -> Self {
        Self {
            id,
            name,
            position,
            owner,
            production_capacity,
            current_production: None,
            production_progress: 0,
        }
    }

    /// Queue `kind`, discarding any progress on the previous order.
    pub fn start_production(&mut self, kind: UnitKind) {
        self.current_production = Some(kind);
        self.production_progress = 0;
    }

    /// Add one turn of production. Returns the kind that completed, if any.
    pub fn advance_production(&mut self) -> Option<UnitKind> {
        let kind = self.current_production?;

        self.production_progress += self.production_capacity;
        if self.production_progress >= kind.stats().cost {
            self.current_production = None;
            self.production_progress = 0;
            return Some(kind);
        }

        None
    }

    pub fn snapshot(&self) -> CitySnapshot {
        CitySnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            owner: self.owner,
            production_capacity: self.production_capacity,
            current_production: self.current_production,
            production_progress: self.production_progress,
        }
    }

    pub fn from_snapshot(snap: &CitySnapshot) -> Self {
        Self {
            id: snap.id,
            name: snap.name.clone(),
            position: snap.position,
            owner: snap.owner,
            production_capacity: snap.production_capacity,
            current_production: snap.current_production,
            production_progress: if snap.current_production.is_some() {
                snap.production_progress.max(0)
            } else {
                0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> City {
        City::new(
            CityId(1),
            "City-P1-1".into(),
            Hex::new(0, 0),
            Some(PlayerId::Player1),
            10,
        )
    }

    #[test]
    fn idle_city_produces_nothing() {
        let mut city = city();
        assert_eq!(city.advance_production(), None);
        assert_eq!(city.production_progress, 0);
    }

    #[test]
    fn infantry_completes_on_fifth_turn() {
        let mut city = city();
        city.start_production(UnitKind::Infantry);

        for turn in 1..=4 {
            assert_eq!(city.advance_production(), None, "turn {turn}");
            assert_eq!(city.production_progress, turn * 10);
        }
        assert_eq!(city.advance_production(), Some(UnitKind::Infantry));
        assert_eq!(city.current_production, None);
        assert_eq!(city.production_progress, 0);
    }

    #[test]
    fn changing_order_discards_progress() {
        let mut city = city();
        city.start_production(UnitKind::Tank);
        city.advance_production();
        city.advance_production();
        assert_eq!(city.production_progress, 20);

        city.start_production(UnitKind::Fighter);
        assert_eq!(city.production_progress, 0);
        assert_eq!(city.current_production, Some(UnitKind::Fighter));
    }

    #[test]
    fn overshoot_still_completes() {
        let mut city = city();
        city.production_capacity = 200;
        city.start_production(UnitKind::Bomber);
        assert_eq!(city.advance_production(), Some(UnitKind::Bomber));
    }
}
