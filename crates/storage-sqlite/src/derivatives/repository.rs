use diesel::prelude::*;
use std::sync::Arc;

use derivatex_core::derivatives::{Derivative, DerivativeFilter, DerivativeRepositoryTrait};
use derivatex_core::errors::Result;

use super::model::{format_date, DerivativeDB};
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::derivatives;
use crate::schema::derivatives::dsl::*;

/// Read side of the derivative store.
///
/// Writes go through `SqliteUnitOfWork` so they share a transaction with the
/// action log.
pub struct DerivativeRepository {
    pool: Arc<DbPool>,
}

impl DerivativeRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl DerivativeRepositoryTrait for DerivativeRepository {
    fn get_by_id(&self, derivative_id: &str) -> Result<Option<Derivative>> {
        let mut conn = get_connection(&self.pool)?;

        derivatives
            .select(DerivativeDB::as_select())
            .find(derivative_id)
            .first::<DerivativeDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Derivative::try_from)
            .transpose()
    }

    /// Lists derivatives matching `filter`, ordered by trade date then code.
    fn list(&self, filter: &DerivativeFilter) -> Result<Vec<Derivative>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = derivatives::table.into_boxed();

        if !filter.include_deleted {
            query = query.filter(deleted.eq(false));
        }
        if let Some(ref wanted_code) = filter.code {
            query = query.filter(code.eq(wanted_code.clone()));
        }
        if let Some(ref wanted_asset) = filter.asset {
            query = query.filter(asset.eq(wanted_asset.clone()));
        }
        if let Some(ref party) = filter.party {
            query = query.filter(
                buying_party
                    .eq(party.clone())
                    .or(selling_party.eq(party.clone())),
            );
        }
        if let Some(from) = filter.traded_from {
            query = query.filter(date_of_trade.ge(format_date(from)));
        }
        if let Some(to) = filter.traded_to {
            query = query.filter(date_of_trade.le(format_date(to)));
        }

        let results = query
            .select(DerivativeDB::as_select())
            .order((date_of_trade.asc(), code.asc()))
            .load::<DerivativeDB>(&mut conn)
            .into_core()?;

        results.into_iter().map(Derivative::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionRepository;
    use crate::db::{create_pool, run_migrations, spawn_writer, WriteHandle};
    use crate::users::UserRepository;
    use chrono::{Duration, NaiveDate};
    use derivatex_core::actions::{ActionFilter, ActionType};
    use derivatex_core::derivatives::{
        DeleteOutcome, DerivativeService, DerivativeServiceTrait, DerivativeUpdate,
        DerivativeUpdates, NewDerivative, UpdateOutcome,
    };
    use derivatex_core::errors::{DatabaseError, Error};
    use derivatex_core::users::{NewUser, UserRepositoryTrait};
    use derivatex_core::utils::time_utils::FixedClock;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn new_derivative(trade_date: NaiveDate) -> NewDerivative {
        NewDerivative {
            code: "doe".to_string(),
            buying_party: "foo".to_string(),
            selling_party: "bar".to_string(),
            asset: "Stocks".to_string(),
            quantity: 1,
            strike_price: dec!(20.20),
            notional_curr_code: "USD".to_string(),
            date_of_trade: trade_date,
            maturity_date: trade_date + Duration::days(365),
        }
    }

    struct Fixture {
        service: DerivativeService<WriteHandle>,
        pool: Arc<DbPool>,
        user_id: String,
        _temp_dir: tempfile::TempDir,
    }

    async fn setup() -> Fixture {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let users = UserRepository::new(Arc::clone(&pool), writer.clone());
        let user = users
            .create(NewUser {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            })
            .await
            .expect("Failed to create user");

        let service = DerivativeService::new(
            Arc::new(DerivativeRepository::new(Arc::clone(&pool))),
            Arc::new(ActionRepository::new(Arc::clone(&pool))),
            writer,
            Arc::new(FixedClock::on(today())),
        );

        Fixture {
            service,
            pool,
            user_id: user.id,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_add_persists_derivative_and_action() {
        let fx = setup().await;

        let added = fx
            .service
            .add_derivative(new_derivative(today()), &fx.user_id)
            .await
            .unwrap();

        let repo = DerivativeRepository::new(Arc::clone(&fx.pool));
        assert_eq!(repo.get_by_id(&added.id).unwrap(), Some(added.clone()));
        assert_eq!(repo.get_by_id("missing").unwrap(), None);

        let actions = fx
            .service
            .get_actions(&ActionFilter::for_derivative(&added.id))
            .unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Add);
        assert_eq!(actions[0].user_id, fx.user_id);
    }

    #[tokio::test]
    async fn test_unknown_user_rolls_back_the_insert() {
        let fx = setup().await;

        let result = fx
            .service
            .add_derivative(new_derivative(today()), "no-such-user")
            .await;

        assert!(matches!(
            result,
            Err(Error::Database(DatabaseError::ForeignKeyViolation(_)))
        ));
        let all = fx
            .service
            .list_derivatives(&DerivativeFilter {
                include_deleted: true,
                ..Default::default()
            })
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_changes_and_log() {
        let fx = setup().await;
        let added = fx
            .service
            .add_derivative(new_derivative(today()), &fx.user_id)
            .await
            .unwrap();

        let updates = DerivativeUpdates::new()
            .with(DerivativeUpdate::BuyingParty("newfoo".to_string()))
            .with(DerivativeUpdate::StrikePrice(dec!(25.5)))
            .with(DerivativeUpdate::Asset("Stocks".to_string()));
        let outcome = fx
            .service
            .update_derivative(&added.id, &fx.user_id, updates)
            .await
            .unwrap();

        let changes = outcome.changes().unwrap().to_vec();
        assert_eq!(changes.len(), 2);

        let stored = fx.service.get_derivative(&added.id).unwrap().unwrap();
        assert_eq!(stored.buying_party, "newfoo");
        assert_eq!(stored.strike_price, dec!(25.5));

        let actions = fx
            .service
            .get_actions(&ActionFilter::for_derivative(&added.id).with_type(ActionType::Update))
            .unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].update_log, Some(changes));
    }

    #[tokio::test]
    async fn test_absolute_derivative_is_left_alone() {
        let fx = setup().await;
        let added = fx
            .service
            .add_derivative(new_derivative(today() - Duration::days(10)), &fx.user_id)
            .await
            .unwrap();

        let update = fx
            .service
            .update_derivative(
                &added.id,
                &fx.user_id,
                DerivativeUpdates::new().with(DerivativeUpdate::Quantity(5)),
            )
            .await
            .unwrap();
        let delete = fx
            .service
            .delete_derivative(&added.id, &fx.user_id)
            .await
            .unwrap();

        assert_eq!(update, UpdateOutcome::RejectedImmutable);
        assert_eq!(delete, DeleteOutcome::RejectedImmutable);
        assert_eq!(fx.service.get_derivative(&added.id).unwrap(), Some(added));
        assert_eq!(
            fx.service.get_actions(&ActionFilter::default()).unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_is_soft_and_filtered_from_listing() {
        let fx = setup().await;
        let kept = fx
            .service
            .add_derivative(new_derivative(today()), &fx.user_id)
            .await
            .unwrap();
        let mut other = new_derivative(today());
        other.code = "abc".to_string();
        let removed = fx.service.add_derivative(other, &fx.user_id).await.unwrap();

        let outcome = fx
            .service
            .delete_derivative(&removed.id, &fx.user_id)
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        let live = fx
            .service
            .list_derivatives(&DerivativeFilter::default())
            .unwrap();
        assert_eq!(live, vec![kept.clone()]);

        let all = fx
            .service
            .list_derivatives(&DerivativeFilter {
                include_deleted: true,
                ..Default::default()
            })
            .unwrap();
        // Same trade date, so ordered by code.
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, "abc");
        assert!(all[0].deleted);

        let again = fx.service.delete_derivative(&removed.id, &fx.user_id).await;
        assert!(matches!(again, Err(Error::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_actions_are_listed_newest_first() {
        let fx = setup().await;
        let added = fx
            .service
            .add_derivative(new_derivative(today()), &fx.user_id)
            .await
            .unwrap();
        fx.service
            .update_derivative(&added.id, &fx.user_id, DerivativeUpdates::new())
            .await
            .unwrap();
        fx.service
            .delete_derivative(&added.id, &fx.user_id)
            .await
            .unwrap();

        let types: Vec<ActionType> = fx
            .service
            .get_actions(&ActionFilter::for_derivative(&added.id).with_user(&fx.user_id))
            .unwrap()
            .into_iter()
            .map(|a| a.action_type)
            .collect();

        assert_eq!(
            types,
            vec![ActionType::Delete, ActionType::Update, ActionType::Add]
        );
    }
}
