//! Club and membership ports over the in-memory store.

use async_trait::async_trait;

use super::MemoryStore;
use crate::domain::ports::{
    ClubCounts, ClubRepository, ClubRepositoryError, MembershipRepository,
    MembershipRepositoryError,
};
use crate::domain::{Club, ClubId, ClubMember, UniversityId, UserAccount, UserId};

#[async_trait]
impl ClubRepository for MemoryStore {
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, ClubRepositoryError> {
        self.read(ClubRepositoryError::query, |state| state.clubs.get(id).cloned())
    }

    async fn list(
        &self,
        university: Option<UniversityId>,
    ) -> Result<Vec<Club>, ClubRepositoryError> {
        self.read(ClubRepositoryError::query, |state| {
            let mut clubs: Vec<_> = state
                .clubs
                .values()
                .filter(|club| university.is_none_or(|id| club.university == id))
                .cloned()
                .collect();
            clubs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            clubs
        })
    }

    async fn find_by_admin(&self, admin: &UserId) -> Result<Option<Club>, ClubRepositoryError> {
        self.read(ClubRepositoryError::query, |state| {
            state
                .clubs
                .values()
                .find(|club| &club.admin == admin)
                .cloned()
        })
    }

    async fn create_with_admin(
        &self,
        club: &Club,
        admin: &UserAccount,
    ) -> Result<(), ClubRepositoryError> {
        self.with_state(ClubRepositoryError::query, |state| {
            if !state.universities.contains_key(&club.university) {
                return Err(ClubRepositoryError::unknown_university(
                    club.university.to_string(),
                ));
            }
            if state.email_taken(admin) {
                return Err(ClubRepositoryError::duplicate_admin_email(
                    admin.user.email.to_string(),
                ));
            }
            if state.clubs.values().any(|existing| existing.admin == club.admin) {
                return Err(ClubRepositoryError::query(
                    "admin already administers a club",
                ));
            }
            state.users.insert(admin.user.id, admin.clone());
            state.clubs.insert(club.id, club.clone());
            Ok(())
        })
    }

    async fn delete_cascading(&self, id: &ClubId) -> Result<bool, ClubRepositoryError> {
        self.with_state(ClubRepositoryError::query, |state| Ok(state.delete_club(id)))
    }

    async fn counts(&self, id: &ClubId) -> Result<ClubCounts, ClubRepositoryError> {
        self.read(ClubRepositoryError::query, |state| ClubCounts {
            members: state.members.keys().filter(|(club, _)| club == id).count() as u64,
            followers: state.follows.iter().filter(|(_, club)| club == id).count() as u64,
        })
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn follow(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        self.with_state(MembershipRepositoryError::query, |state| {
            Ok(state.follows.insert((*user, *club)))
        })
    }

    async fn unfollow(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        self.with_state(MembershipRepositoryError::query, |state| {
            Ok(state.follows.remove(&(*user, *club)))
        })
    }

    async fn is_follower(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        self.read(MembershipRepositoryError::query, |state| {
            state.follows.contains(&(*user, *club))
        })
    }

    async fn is_member(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        self.read(MembershipRepositoryError::query, |state| {
            state.members.contains_key(&(*club, *user))
        })
    }

    async fn remove_member(
        &self,
        club: &ClubId,
        user: &UserId,
    ) -> Result<bool, MembershipRepositoryError> {
        self.with_state(MembershipRepositoryError::query, |state| {
            Ok(state.members.remove(&(*club, *user)).is_some())
        })
    }

    async fn list_members(
        &self,
        club: &ClubId,
    ) -> Result<Vec<ClubMember>, MembershipRepositoryError> {
        self.read(MembershipRepositoryError::query, |state| {
            let mut members: Vec<_> = state
                .members
                .iter()
                .filter(|((member_club, _), _)| member_club == club)
                .map(|(_, member)| member.clone())
                .collect();
            members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.user.cmp(&b.user)));
            members
        })
    }

    async fn followed_clubs(
        &self,
        user: &UserId,
    ) -> Result<Vec<ClubId>, MembershipRepositoryError> {
        self.read(MembershipRepositoryError::query, |state| {
            state
                .follows
                .iter()
                .filter(|(follower, _)| follower == user)
                .map(|(_, club)| *club)
                .collect()
        })
    }

    async fn joined_clubs(&self, user: &UserId) -> Result<Vec<ClubId>, MembershipRepositoryError> {
        self.read(MembershipRepositoryError::query, |state| {
            state
                .members
                .keys()
                .filter(|(_, member)| member == user)
                .map(|(club, _)| *club)
                .collect()
        })
    }
}
