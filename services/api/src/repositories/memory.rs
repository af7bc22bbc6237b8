//! In-process store for development and tests

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use domain::{
    DomainError, InventoryMovement, Material, MaterialDraft, NewOrder, NewSection, NewUser, Order,
    OrderStatus, ProgressPolicy, ProgressUpdate, ScheduleEntry, ScheduleRecord, ScheduleUser,
    Section, User, WorkHours, YearMonth,
};
use tokio::sync::Mutex;

use super::{
    MaterialStore, OrderStore, ScheduleStore, SectionStore, StoreResult, UserCredentials,
    UserStore,
};

#[derive(Debug, Clone, Copy)]
struct Slot {
    id: i64,
    user_id: i64,
    work_date: NaiveDate,
    hours: WorkHours,
}

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, UserCredentials>,
    materials: BTreeMap<i64, Material>,
    movements: Vec<InventoryMovement>,
    sections: BTreeMap<i64, Section>,
    orders: BTreeMap<i64, Order>,
    schedule: BTreeMap<i64, Slot>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn record(&self, slot: &Slot) -> ScheduleRecord {
        let (full_name, login) = self
            .users
            .get(&slot.user_id)
            .map(|c| (c.user.full_name.clone(), c.user.login.clone()))
            .unwrap_or_default();
        ScheduleRecord {
            id: slot.id,
            user_id: slot.user_id,
            work_date: slot.work_date,
            hours: slot.hours,
            full_name,
            login,
        }
    }
}

/// All records behind a single async mutex
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().rev().map(|c| c.user.clone()).collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_credentials(&self, login: &str) -> StoreResult<Option<UserCredentials>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|c| c.user.login == login)
            .cloned())
    }

    async fn insert(&self, user: &NewUser, password_hash: &str) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|c| c.user.login == user.login) {
            return Err(DomainError::Conflict(format!(
                "Login '{}' is already taken",
                user.login
            ))
            .into());
        }

        let id = state.next_id();
        let created = User {
            id,
            login: user.login.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            UserCredentials {
                user: created.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(created)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .users
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("user", id))?;
        state.schedule.retain(|_, slot| slot.user_id != id);
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.state.lock().await.users.len() as i64)
    }
}

#[async_trait]
impl MaterialStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Material>> {
        let state = self.state.lock().await;
        Ok(state.materials.values().rev().cloned().collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Material>> {
        Ok(self.state.lock().await.materials.get(&id).cloned())
    }

    async fn insert(&self, draft: &MaterialDraft) -> StoreResult<Material> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        let material = Material {
            id,
            name: draft.name.clone(),
            size: draft.size.clone(),
            color: draft.color.clone(),
            quantity: draft.quantity,
            material_type: draft.material_type.clone(),
            image_url: draft.image_url.clone(),
            section_id: draft.section_id,
            created_at: now,
            updated_at: now,
        };
        state.materials.insert(id, material.clone());
        Ok(material)
    }

    async fn replace(&self, id: i64, draft: &MaterialDraft) -> StoreResult<Material> {
        let mut state = self.state.lock().await;
        let material = state
            .materials
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("material", id))?;
        material.replace_with(draft);
        material.updated_at = Utc::now();
        Ok(material.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .materials
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("material", id))?;
        state.movements.retain(|m| m.material_id != id);
        Ok(())
    }

    async fn apply_delta(&self, id: i64, delta: i32, actor: Option<i64>) -> StoreResult<Material> {
        let mut state = self.state.lock().await;
        let mut material = state
            .materials
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("material", id))?;

        material.apply_delta(delta)?;
        material.updated_at = Utc::now();

        let movement_id = state.next_id();
        state.movements.push(InventoryMovement {
            id: movement_id,
            material_id: id,
            quantity_change: delta,
            updated_by: actor,
            created_at: material.updated_at,
        });
        state.materials.insert(id, material.clone());
        Ok(material)
    }

    async fn movements(&self, material_id: i64) -> StoreResult<Vec<InventoryMovement>> {
        let state = self.state.lock().await;
        if !state.materials.contains_key(&material_id) {
            return Err(DomainError::not_found("material", material_id).into());
        }
        Ok(state
            .movements
            .iter()
            .rev()
            .filter(|m| m.material_id == material_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SectionStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Section>> {
        let state = self.state.lock().await;
        Ok(state.sections.values().cloned().collect())
    }

    async fn insert(&self, section: &NewSection) -> StoreResult<Section> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let created = Section {
            id,
            name: section.name.clone(),
            description: section.description.clone(),
            created_at: Utc::now(),
        };
        state.sections.insert(id, created.clone());
        Ok(created)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .sections
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("section", id))?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn insert(&self, order: &NewOrder) -> StoreResult<Order> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        let created = Order {
            id,
            order_number: order.order_number.clone(),
            material: order.material.clone(),
            quantity: order.quantity,
            size: order.size.clone(),
            color: order.color.clone(),
            status: OrderStatus::Created,
            completed_quantity: 0,
            created_by: order.created_by,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn record_progress(
        &self,
        id: i64,
        update: ProgressUpdate,
        policy: ProgressPolicy,
    ) -> StoreResult<Order> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("order", id))?;
        let mut next = order.clone();
        next.record_progress(update, policy)?;
        next.updated_at = Utc::now();
        *order = next.clone();
        Ok(next)
    }

    async fn set_status(&self, id: i64, status: OrderStatus) -> StoreResult<Order> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("order", id))?;
        let mut next = order.clone();
        next.set_status(status)?;
        next.updated_at = Utc::now();
        *order = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .orders
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("order", id))?;
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn month(&self, month: &YearMonth) -> StoreResult<Vec<ScheduleRecord>> {
        let state = self.state.lock().await;
        let mut records: Vec<ScheduleRecord> = state
            .schedule
            .values()
            .filter(|slot| month.contains(slot.work_date))
            .map(|slot| state.record(slot))
            .collect();
        records.sort_by(|a, b| {
            a.work_date
                .cmp(&b.work_date)
                .then_with(|| a.full_name.cmp(&b.full_name))
        });
        Ok(records)
    }

    async fn roster(&self) -> StoreResult<Vec<ScheduleUser>> {
        let state = self.state.lock().await;
        let mut users: Vec<ScheduleUser> = state
            .users
            .values()
            .filter(|c| c.user.role.is_scheduled())
            .map(|c| ScheduleUser {
                id: c.user.id,
                full_name: c.user.full_name.clone(),
                login: c.user.login.clone(),
            })
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }

    async fn upsert(&self, entry: &ScheduleEntry) -> StoreResult<ScheduleRecord> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&entry.user_id) {
            return Err(DomainError::not_found("user", entry.user_id).into());
        }

        let existing = state
            .schedule
            .values()
            .find(|slot| slot.user_id == entry.user_id && slot.work_date == entry.work_date)
            .map(|slot| slot.id);

        let id = match existing {
            Some(id) => id,
            None => state.next_id(),
        };
        let slot = Slot {
            id,
            user_id: entry.user_id,
            work_date: entry.work_date,
            hours: entry.hours,
        };
        state.schedule.insert(id, slot);
        Ok(state.record(&slot))
    }

    async fn update_hours(&self, id: i64, hours: WorkHours) -> StoreResult<ScheduleRecord> {
        let mut state = self.state.lock().await;
        let slot = state
            .schedule
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("schedule record", id))?;
        slot.hours = hours;
        let slot = *slot;
        Ok(state.record(&slot))
    }
}
