//! Application and notification ports over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::MemoryStore;
use crate::domain::ports::{
    ApplicationRepository, ApplicationRepositoryError, NotificationRepository,
    NotificationRepositoryError,
};
use crate::domain::{
    ApplicationId, ClubApplication, ClubId, ClubMember, Notification, NotificationId, Resolution,
    ResolveOutcome, UserId, sort_most_recent_first,
};

fn newest_first(applications: &mut [ClubApplication]) {
    applications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ClubApplication>, ApplicationRepositoryError> {
        self.read(ApplicationRepositoryError::query, |state| {
            state.applications.get(id).cloned()
        })
    }

    async fn find_pending(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<Option<ClubApplication>, ApplicationRepositoryError> {
        self.read(ApplicationRepositoryError::query, |state| {
            state
                .applications
                .values()
                .find(|application| {
                    &application.user == user && &application.club == club && application.is_pending()
                })
                .cloned()
        })
    }

    async fn insert_pending(
        &self,
        application: &ClubApplication,
    ) -> Result<(), ApplicationRepositoryError> {
        self.with_state(ApplicationRepositoryError::query, |state| {
            let duplicate = state.applications.values().any(|existing| {
                existing.user == application.user
                    && existing.club == application.club
                    && existing.is_pending()
            });
            if duplicate {
                return Err(ApplicationRepositoryError::duplicate_pending(
                    application.club.to_string(),
                ));
            }
            state
                .applications
                .insert(application.id, application.clone());
            Ok(())
        })
    }

    async fn delete_pending(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, ApplicationRepositoryError> {
        self.with_state(ApplicationRepositoryError::query, |state| {
            let before = state.applications.len();
            state.applications.retain(|_, application| {
                !(&application.user == user && &application.club == club && application.is_pending())
            });
            Ok(state.applications.len() < before)
        })
    }

    async fn resolve_pending(
        &self,
        id: &ApplicationId,
        resolution: Resolution,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolveOutcome, ApplicationRepositoryError> {
        self.with_state(ApplicationRepositoryError::query, |state| {
            let Some(application) = state.applications.get_mut(id) else {
                return Ok(ResolveOutcome::Missing);
            };
            if !application.is_pending() {
                return Ok(ResolveOutcome::AlreadyResolved);
            }
            application.status = resolution.status();
            application.resolved_at = Some(resolved_at);
            let resolved = application.clone();
            if resolution == Resolution::Accept {
                state
                    .members
                    .entry((resolved.club, resolved.user))
                    .or_insert_with(|| ClubMember {
                        user: resolved.user,
                        club: resolved.club,
                        joined_at: resolved_at,
                    });
            }
            Ok(ResolveOutcome::Resolved(resolved))
        })
    }

    async fn list_for_club(
        &self,
        club: &ClubId,
    ) -> Result<Vec<ClubApplication>, ApplicationRepositoryError> {
        self.read(ApplicationRepositoryError::query, |state| {
            let mut applications: Vec<_> = state
                .applications
                .values()
                .filter(|application| &application.club == club)
                .cloned()
                .collect();
            newest_first(&mut applications);
            applications
        })
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ClubApplication>, ApplicationRepositoryError> {
        self.read(ApplicationRepositoryError::query, |state| {
            let mut applications: Vec<_> = state
                .applications
                .values()
                .filter(|application| &application.user == user)
                .cloned()
                .collect();
            newest_first(&mut applications);
            applications
        })
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        self.with_state(NotificationRepositoryError::query, |state| {
            state
                .notifications
                .insert(notification.id, notification.clone());
            Ok(())
        })
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        self.read(NotificationRepositoryError::query, |state| {
            state.notifications.get(id).cloned()
        })
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), NotificationRepositoryError> {
        self.with_state(NotificationRepositoryError::query, |state| {
            if let Some(notification) = state.notifications.get_mut(id) {
                notification.read = true;
            }
            Ok(())
        })
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        self.read(NotificationRepositoryError::query, |state| {
            let mut notifications: Vec<_> = state
                .notifications
                .values()
                .filter(|notification| &notification.user == user)
                .filter(|notification| !unread_only || !notification.read)
                .cloned()
                .collect();
            sort_most_recent_first(&mut notifications);
            notifications
        })
    }

    async fn count_unread(&self, user: &UserId) -> Result<u64, NotificationRepositoryError> {
        self.read(NotificationRepositoryError::query, |state| {
            state
                .notifications
                .values()
                .filter(|notification| &notification.user == user && !notification.read)
                .count() as u64
        })
    }
}
