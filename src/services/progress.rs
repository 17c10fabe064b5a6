// src/services/progress.rs
//
// Agregação de progresso do LMS. Funções puras: recebem os registros já
// carregados e não tocam no banco.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::models::lms::{
    Course, Ineligibility, LearningOverview, LearningProgress, PlanProgress, ProgressStatus,
};

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Cursos do plano concluídos pelo usuário. Duplicatas no plano contam uma vez.
pub fn calculate_plan_progress(plan_courses: &[i64], records: &[LearningProgress]) -> PlanProgress {
    let courses: HashSet<i64> = plan_courses.iter().copied().collect();
    let total = courses.len();

    let completed = records
        .iter()
        .filter(|r| r.status == ProgressStatus::Completed && courses.contains(&r.course_id))
        .map(|r| r.course_id)
        .collect::<HashSet<_>>()
        .len();

    PlanProgress { completed, total, percentage: percent(completed, total) }
}

/// Motivo pelo qual o usuário não pode se matricular, se houver.
pub fn enrollment_blocker(course: &Course, user_records: &[LearningProgress]) -> Option<Ineligibility> {
    if user_records.iter().any(|r| r.course_id == course.id) {
        return Some(Ineligibility::AlreadyEnrolled);
    }

    let done: HashSet<i64> = user_records
        .iter()
        .filter(|r| r.status == ProgressStatus::Completed)
        .map(|r| r.course_id)
        .collect();

    let missing: Vec<i64> = course
        .prerequisites
        .iter()
        .copied()
        .filter(|id| !done.contains(id))
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(Ineligibility::MissingPrerequisites { missing })
    }
}

pub fn can_enroll_in_course(course: &Course, user_records: &[LearningProgress]) -> bool {
    enrollment_blocker(course, user_records).is_none()
}

/// Status sempre calculado no servidor a partir do percentual.
pub fn derive_status(progress: i32, due_date: Option<NaiveDate>, today: NaiveDate) -> ProgressStatus {
    if progress >= 100 {
        return ProgressStatus::Completed;
    }
    if due_date.is_some_and(|due| due < today) {
        return ProgressStatus::Overdue;
    }
    if progress <= 0 {
        ProgressStatus::NotStarted
    } else {
        ProgressStatus::InProgress
    }
}

pub fn overall_progress(records: &[LearningProgress]) -> LearningOverview {
    let total = records.len();
    let count = |status: ProgressStatus| records.iter().filter(|r| r.status == status).count();
    let completed = count(ProgressStatus::Completed);

    let average_progress = if total == 0 {
        0
    } else {
        let sum: i64 = records.iter().map(|r| i64::from(r.progress)).sum();
        (sum as f64 / total as f64).round() as u32
    };

    LearningOverview {
        total,
        completed,
        in_progress: count(ProgressStatus::InProgress),
        not_started: count(ProgressStatus::NotStarted),
        overdue: count(ProgressStatus::Overdue),
        average_progress,
        completion_percentage: percent(completed, total),
    }
}

/// Procura um ciclo que passe por `course_id` se seus pré-requisitos
/// passarem a ser `prerequisites`. `graph` traz os demais cursos.
/// Devolve o caminho do ciclo (começando e terminando em `course_id`).
pub fn find_prerequisite_cycle(
    course_id: i64,
    prerequisites: &[i64],
    graph: &HashMap<i64, Vec<i64>>,
) -> Option<Vec<i64>> {
    // DFS iterativa com o caminho atual na pilha
    let mut stack: Vec<(i64, Vec<i64>)> = prerequisites
        .iter()
        .map(|&p| (p, vec![course_id, p]))
        .collect();
    let mut visited = HashSet::new();

    while let Some((node, path)) = stack.pop() {
        if node == course_id {
            return Some(path);
        }
        if !visited.insert(node) {
            continue;
        }
        if let Some(next) = graph.get(&node) {
            for &n in next {
                let mut p = path.clone();
                p.push(n);
                stack.push((n, p));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lms::{CourseLevel, ProgressSource, PublishStatus};
    use chrono::Utc;

    fn record(course_id: i64, status: ProgressStatus, progress: i32) -> LearningProgress {
        LearningProgress {
            id: course_id * 10,
            user_id: 1,
            course_id,
            source: ProgressSource::Direct,
            source_id: None,
            progress,
            status,
            score: None,
            due_date: None,
            started_at: None,
            completed_at: None,
            last_accessed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn course(id: i64, prerequisites: Vec<i64>) -> Course {
        Course {
            id,
            title: format!("Curso {}", id),
            description: None,
            category: "Geral".into(),
            level: CourseLevel::Beginner,
            duration_hours: None,
            instructor: None,
            tags: vec![],
            prerequisites,
            status: PublishStatus::Active,
            created_by: None,
            enrolled_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn empty_plan_has_no_progress() {
        let p = calculate_plan_progress(&[], &[record(1, ProgressStatus::Completed, 100)]);
        assert_eq!(p, PlanProgress { completed: 0, total: 0, percentage: 0 });
    }

    #[test]
    fn plan_counts_completed_courses_only() {
        let records = vec![
            record(1, ProgressStatus::Completed, 100),
            record(2, ProgressStatus::InProgress, 50),
            record(3, ProgressStatus::Completed, 100), // fora do plano
        ];
        let p = calculate_plan_progress(&[1, 2], &records);
        assert_eq!(p, PlanProgress { completed: 1, total: 2, percentage: 50 });
    }

    #[test]
    fn duplicated_plan_courses_count_once() {
        let records = vec![record(1, ProgressStatus::Completed, 100)];
        let p = calculate_plan_progress(&[1, 1, 2], &records);
        assert_eq!(p, PlanProgress { completed: 1, total: 2, percentage: 50 });
    }

    #[test]
    fn percentage_is_rounded() {
        let records = vec![record(1, ProgressStatus::Completed, 100), record(2, ProgressStatus::Completed, 100)];
        assert_eq!(calculate_plan_progress(&[1, 2, 3], &records).percentage, 67);
    }

    #[test]
    fn enrollment_requires_completed_prerequisites() {
        let advanced = course(3, vec![1, 2]);

        let partial = vec![record(1, ProgressStatus::Completed, 100), record(2, ProgressStatus::InProgress, 30)];
        assert!(!can_enroll_in_course(&advanced, &partial));
        assert_eq!(
            enrollment_blocker(&advanced, &partial),
            Some(Ineligibility::MissingPrerequisites { missing: vec![2] })
        );

        let done = vec![record(1, ProgressStatus::Completed, 100), record(2, ProgressStatus::Completed, 100)];
        assert!(can_enroll_in_course(&advanced, &done));
    }

    #[test]
    fn enrollment_blocked_when_already_enrolled() {
        let basic = course(1, vec![]);
        let records = vec![record(1, ProgressStatus::NotStarted, 0)];
        assert!(!can_enroll_in_course(&basic, &records));
        assert_eq!(enrollment_blocker(&basic, &records), Some(Ineligibility::AlreadyEnrolled));
        assert!(can_enroll_in_course(&basic, &[]));
    }

    #[test]
    fn status_follows_progress_and_due_date() {
        let today = day(15);
        assert_eq!(derive_status(0, None, today), ProgressStatus::NotStarted);
        assert_eq!(derive_status(45, None, today), ProgressStatus::InProgress);
        assert_eq!(derive_status(100, None, today), ProgressStatus::Completed);
        assert_eq!(derive_status(45, Some(day(14)), today), ProgressStatus::Overdue);
        assert_eq!(derive_status(0, Some(day(14)), today), ProgressStatus::Overdue);
        // Concluído nunca fica atrasado; vencimento hoje ainda não atrasou
        assert_eq!(derive_status(100, Some(day(1)), today), ProgressStatus::Completed);
        assert_eq!(derive_status(45, Some(today), today), ProgressStatus::InProgress);
    }

    #[test]
    fn overview_aggregates_records() {
        let records = vec![
            record(1, ProgressStatus::Completed, 100),
            record(2, ProgressStatus::InProgress, 50),
            record(3, ProgressStatus::NotStarted, 0),
            record(4, ProgressStatus::Overdue, 25),
        ];
        let o = overall_progress(&records);
        assert_eq!(o.total, 4);
        assert_eq!(o.completed, 1);
        assert_eq!(o.in_progress, 1);
        assert_eq!(o.not_started, 1);
        assert_eq!(o.overdue, 1);
        assert_eq!(o.average_progress, 44);
        assert_eq!(o.completion_percentage, 25);

        assert_eq!(overall_progress(&[]).average_progress, 0);
    }

    #[test]
    fn detects_self_reference_and_indirect_cycles() {
        let graph = HashMap::from([(2, vec![3]), (3, vec![1])]);

        assert_eq!(find_prerequisite_cycle(1, &[1], &HashMap::new()), Some(vec![1, 1]));
        assert_eq!(find_prerequisite_cycle(1, &[2], &graph), Some(vec![1, 2, 3, 1]));
        assert_eq!(find_prerequisite_cycle(4, &[2], &HashMap::from([(2, vec![3])])), None);
    }
}
