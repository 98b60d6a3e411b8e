//! Loading the rows a statistics unit is computed from.

use tracing::debug;

use super::Storage;
use crate::config::StatisticsConfig;
use crate::dates::date_to_short;
use crate::error::{Error, Result};
use crate::model::League;
use crate::statistics::{SourceSeries, StatisticsSource, StatisticsUnit};

impl Storage {
    /// Materialize the series and games covered by `unit`.
    ///
    /// Bowler and team units skip event leagues and the open league when
    /// `options` says so. League, series and game units always cover what
    /// they name.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit doesn't exist or the database operation
    /// fails.
    pub fn load_statistics_source(
        &self,
        unit: StatisticsUnit,
        options: &StatisticsConfig,
    ) -> Result<StatisticsSource> {
        let (name, leagues, series) = match unit {
            StatisticsUnit::Bowler(id) => {
                let bowler = self
                    .get_bowler(id)?
                    .ok_or_else(|| Error::not_found("bowler", id))?;
                let leagues = self.included_leagues(id, options)?;
                let series = self.series_for_leagues(&leagues)?;
                (bowler.name, leagues, series)
            }
            StatisticsUnit::Team(id) => {
                let team = self
                    .get_team(id)?
                    .ok_or_else(|| Error::not_found("team", id))?;
                let mut leagues = Vec::new();
                for member in &team.members {
                    leagues.extend(self.included_leagues(*member, options)?);
                }
                let series = self.series_for_leagues(&leagues)?;
                (team.name, leagues, series)
            }
            StatisticsUnit::League(id) => {
                let league = self
                    .get_league(id)?
                    .ok_or_else(|| Error::not_found("league", id))?;
                let series = self.series_for_leagues(std::slice::from_ref(&league))?;
                (league.name.clone(), vec![league], series)
            }
            StatisticsUnit::Series(id) => {
                let series = self
                    .get_series(id)?
                    .ok_or_else(|| Error::not_found("series", id))?;
                let league = self.league_of(series.league_id)?;
                let name = format!("{} {}", league.name, date_to_short(&series.date));
                (name, Vec::new(), vec![source_series(&league, series)])
            }
            StatisticsUnit::Game(id) => {
                let game = self
                    .get_game(id)?
                    .ok_or_else(|| Error::not_found("game", id))?;
                let mut series = self
                    .get_series(game.series_id)?
                    .ok_or_else(|| Error::not_found("series", game.series_id))?;
                let league = self.league_of(series.league_id)?;
                let name = format!("Game {}", game.ordinal);
                series.games = vec![game];
                (name, Vec::new(), vec![source_series(&league, series)])
            }
        };

        debug!(
            "Loaded {} series across {} leagues for {}",
            series.len(),
            leagues.len(),
            unit
        );

        Ok(StatisticsSource {
            unit,
            name,
            leagues,
            series,
        })
    }

    fn included_leagues(&self, bowler_id: i64, options: &StatisticsConfig) -> Result<Vec<League>> {
        Ok(self
            .list_leagues(bowler_id)?
            .into_iter()
            .filter(|l| options.include_events || !l.is_event)
            .filter(|l| options.include_open_games || !l.is_open())
            .collect())
    }

    fn series_for_leagues(&self, leagues: &[League]) -> Result<Vec<SourceSeries>> {
        let mut series = Vec::new();
        for league in leagues {
            let Some(id) = league.id else { continue };
            series.extend(
                self.list_series(id)?
                    .into_iter()
                    .map(|s| source_series(league, s)),
            );
        }
        Ok(series)
    }

    fn league_of(&self, league_id: i64) -> Result<League> {
        self.get_league(league_id)?
            .ok_or_else(|| Error::not_found("league", league_id))
    }
}

fn source_series(league: &League, series: crate::model::Series) -> SourceSeries {
    SourceSeries {
        game_highlight: league.game_highlight,
        series_highlight: league.series_highlight,
        series,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{Bowler, Team};
    use crate::statistics::{compute, StatisticValue};
    use crate::storage::tests::create_test_storage;

    struct Fixture {
        storage: Storage,
        bowler: i64,
        league: i64,
        event: i64,
        open: i64,
    }

    /// One bowler with a 250 in the league, 300 in the event and 150 in
    /// the open league.
    fn fixture() -> Fixture {
        let storage = create_test_storage();
        let bowler = storage.insert_bowler(&Bowler::new("Joseph")).unwrap();
        let league = storage
            .insert_league(&League::new(bowler, "Monday", 1))
            .unwrap();
        let mut event = League::new(bowler, "Cup", 1);
        event.is_event = true;
        let event = storage.insert_league(&event).unwrap();
        let open = storage.open_league(bowler).unwrap().id.unwrap();

        let date = NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for (league_id, score) in [(league, 250), (event, 300), (open, 150)] {
            let series = storage.insert_series(league_id, date, None).unwrap();
            let game = storage.list_games(series).unwrap()[0].id.unwrap();
            storage.set_manual_score(game, score).unwrap();
        }

        Fixture {
            storage,
            bowler,
            league,
            event,
            open,
        }
    }

    fn total(source: &StatisticsSource) -> StatisticValue {
        compute(source).get("total_pinfall").unwrap().value
    }

    #[test]
    fn test_bowler_source_includes_everything_by_default() {
        let f = fixture();
        let source = f
            .storage
            .load_statistics_source(StatisticsUnit::Bowler(f.bowler), &StatisticsConfig::default())
            .unwrap();

        assert_eq!(source.name, "Joseph");
        assert_eq!(source.leagues.len(), 3);
        assert_eq!(source.series.len(), 3);
        assert_eq!(total(&source), StatisticValue::Count(700));
    }

    #[test]
    fn test_bowler_source_honors_filters() {
        let f = fixture();
        let options = StatisticsConfig {
            include_events: false,
            include_open_games: false,
        };
        let source = f
            .storage
            .load_statistics_source(StatisticsUnit::Bowler(f.bowler), &options)
            .unwrap();

        assert_eq!(source.series.len(), 1);
        assert_eq!(total(&source), StatisticValue::Count(250));

        let events_only = StatisticsConfig {
            include_events: true,
            include_open_games: false,
        };
        let source = f
            .storage
            .load_statistics_source(StatisticsUnit::Bowler(f.bowler), &events_only)
            .unwrap();
        assert_eq!(total(&source), StatisticValue::Count(550));
    }

    #[test]
    fn test_league_source_ignores_filters() {
        let f = fixture();
        let options = StatisticsConfig {
            include_events: false,
            include_open_games: false,
        };
        for (league, expected) in [(f.event, 300), (f.open, 150), (f.league, 250)] {
            let source = f
                .storage
                .load_statistics_source(StatisticsUnit::League(league), &options)
                .unwrap();
            assert_eq!(total(&source), StatisticValue::Count(expected));
        }
    }

    #[test]
    fn test_team_source() {
        let f = fixture();
        let other = f.storage.insert_bowler(&Bowler::new("Sam")).unwrap();
        let other_league = f
            .storage
            .insert_league(&League::new(other, "Monday", 1))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = f.storage.insert_series(other_league, date, None).unwrap();
        let game = f.storage.list_games(series).unwrap()[0].id.unwrap();
        f.storage.set_manual_score(game, 100).unwrap();

        let team = f
            .storage
            .insert_team(&Team::new("Pinheads", vec![f.bowler, other]))
            .unwrap();
        let source = f
            .storage
            .load_statistics_source(StatisticsUnit::Team(team), &StatisticsConfig::default())
            .unwrap();

        assert_eq!(source.name, "Pinheads");
        assert_eq!(total(&source), StatisticValue::Count(800));
    }

    #[test]
    fn test_series_and_game_sources() {
        let f = fixture();
        let series = f.storage.list_series(f.league).unwrap()[0].clone();
        let series_id = series.id.unwrap();
        let game_id = series.games[0].id.unwrap();

        let source = f
            .storage
            .load_statistics_source(StatisticsUnit::Series(series_id), &StatisticsConfig::default())
            .unwrap();
        assert_eq!(source.name, "Monday 01/01");
        assert!(source.leagues.is_empty());
        assert_eq!(total(&source), StatisticValue::Count(250));

        let source = f
            .storage
            .load_statistics_source(StatisticsUnit::Game(game_id), &StatisticsConfig::default())
            .unwrap();
        assert_eq!(source.name, "Game 1");
        assert_eq!(source.series[0].series.games.len(), 1);
    }

    #[test]
    fn test_missing_unit() {
        let storage = create_test_storage();
        let options = StatisticsConfig::default();
        for unit in [
            StatisticsUnit::Bowler(1),
            StatisticsUnit::Team(1),
            StatisticsUnit::League(1),
            StatisticsUnit::Series(1),
            StatisticsUnit::Game(1),
        ] {
            let err = storage.load_statistics_source(unit, &options).unwrap_err();
            assert!(err.is_not_found(), "{unit} should be missing");
        }
    }
}
