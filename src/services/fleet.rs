use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::compliance_document::{
        self, Entity as ComplianceDocumentEntity, FleetEntityType,
    },
    entities::driver::{Entity as DriverEntity, Model as DriverModel},
    entities::fleet_reservation::{
        self, ActiveModel as ReservationActiveModel, Entity as ReservationEntity,
    },
    entities::truck::{self, Entity as TruckEntity, Model as TruckModel},
    errors::ServiceError,
};

/// A truck and its paired driver, eligible for dispatch as a unit.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FleetPair {
    pub truck_id: Uuid,
    pub plate_number: String,
    pub capacity: rust_decimal::Decimal,
    pub driver_id: Uuid,
    pub driver_name: String,
}

/// Computes dispatch eligibility and owns the reservation discipline.
/// Availability is recomputed on demand; busy-ness is an O(1) lookup on the
/// reservations table, not a scan over non-delivered orders.
#[derive(Clone)]
pub struct FleetService {
    db: Arc<DatabaseConnection>,
}

impl FleetService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The candidate set for a new dispatch: active, compliant, paired, and
    /// not currently reserved. Ordered by plate number so the result is
    /// deterministic for the UI.
    #[instrument(skip(self))]
    pub async fn available_pairs(&self) -> Result<Vec<FleetPair>, ServiceError> {
        let db = &*self.db;

        let busy = self.busy_truck_ids().await?;

        let trucks = TruckEntity::find()
            .filter(truck::Column::Active.eq(true))
            .filter(truck::Column::DriverId.is_not_null())
            .order_by_asc(truck::Column::PlateNumber)
            .find_also_related(DriverEntity)
            .all(db)
            .await?;

        let mut pairs = Vec::new();
        for (truck_model, driver_model) in trucks {
            let Some(driver_model) = driver_model else {
                continue;
            };
            if !driver_model.active || busy.contains(&truck_model.id) {
                continue;
            }
            if self
                .has_expired_document(db, FleetEntityType::Truck, truck_model.id)
                .await?
                || self
                    .has_expired_document(db, FleetEntityType::Driver, driver_model.id)
                    .await?
            {
                continue;
            }
            pairs.push(FleetPair {
                truck_id: truck_model.id,
                plate_number: truck_model.plate_number.clone(),
                capacity: truck_model.capacity,
                driver_id: driver_model.id,
                driver_name: driver_model.name.clone(),
            });
        }

        info!(available = pairs.len(), "Computed fleet availability");
        Ok(pairs)
    }

    /// Truck ids currently holding an open reservation.
    pub async fn busy_truck_ids(&self) -> Result<Vec<Uuid>, ServiceError> {
        let reservations = ReservationEntity::find()
            .filter(fleet_reservation::Column::ReleasedAt.is_null())
            .all(&*self.db)
            .await?;
        Ok(reservations.into_iter().map(|r| r.truck_id).collect())
    }

    /// Validates a chosen pair at dispatch time, inside the dispatch
    /// transaction. Returns the master records so the caller can default
    /// fuel cost and allowance from them. Reservation conflicts are not
    /// checked here; they surface atomically from `reserve`.
    pub async fn check_pair<C: ConnectionTrait>(
        &self,
        conn: &C,
        truck_id: Uuid,
        driver_id: Uuid,
    ) -> Result<(TruckModel, DriverModel), ServiceError> {
        let truck = TruckEntity::find_by_id(truck_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Truck {} not found", truck_id)))?;

        let driver = DriverEntity::find_by_id(driver_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Driver {} not found", driver_id)))?;

        if truck.driver_id != Some(driver_id) {
            return Err(ServiceError::PreconditionFailed(format!(
                "Driver {} is not paired with truck {}",
                driver.name, truck.plate_number
            )));
        }
        if !truck.active {
            return Err(ServiceError::PreconditionFailed(format!(
                "Truck {} is inactive",
                truck.plate_number
            )));
        }
        if !driver.active {
            return Err(ServiceError::PreconditionFailed(format!(
                "Driver {} is inactive",
                driver.name
            )));
        }
        if self
            .has_expired_document(conn, FleetEntityType::Truck, truck_id)
            .await?
        {
            return Err(ServiceError::PreconditionFailed(format!(
                "Truck {} has an expired compliance document",
                truck.plate_number
            )));
        }
        if self
            .has_expired_document(conn, FleetEntityType::Driver, driver_id)
            .await?
        {
            return Err(ServiceError::PreconditionFailed(format!(
                "Driver {} has an expired compliance document",
                driver.name
            )));
        }

        Ok((truck, driver))
    }

    /// Acquires the per-truck reservation. The partial unique index on open
    /// reservations turns a racing double-dispatch into a Conflict here
    /// instead of a double-booking.
    pub async fn reserve<C: ConnectionTrait>(
        &self,
        conn: &C,
        truck_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let reservation = ReservationActiveModel {
            id: Set(Uuid::new_v4()),
            truck_id: Set(truck_id),
            order_id: Set(order_id),
            acquired_at: Set(Utc::now()),
            released_at: Set(None),
        };

        reservation.insert(conn).await.map_err(|e| {
            ServiceError::conflict_on_unique(e, "Truck is already reserved by another dispatch")
        })?;

        Ok(())
    }

    /// Releases the open reservation held for an order, if any. Called at
    /// delivery and at order deletion, within the caller's transaction.
    pub async fn release<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let open = ReservationEntity::find()
            .filter(fleet_reservation::Column::OrderId.eq(order_id))
            .filter(fleet_reservation::Column::ReleasedAt.is_null())
            .one(conn)
            .await?;

        if let Some(reservation) = open {
            let mut active: fleet_reservation::ActiveModel = reservation.into();
            active.released_at = Set(Some(Utc::now()));
            active.update(conn).await?;
        }

        Ok(())
    }

    async fn has_expired_document<C: ConnectionTrait>(
        &self,
        conn: &C,
        entity_type: FleetEntityType,
        entity_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let expired = ComplianceDocumentEntity::find()
            .filter(compliance_document::Column::EntityType.eq(entity_type))
            .filter(compliance_document::Column::EntityId.eq(entity_id))
            .filter(compliance_document::Column::ExpiresAt.lt(Utc::now()))
            .one(conn)
            .await?;
        Ok(expired.is_some())
    }
}
