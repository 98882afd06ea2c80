//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that stays inside the standard catalog and passes submission checks.

use chrono::NaiveDate;
use domain_lending::{
    DocumentUpload, EmploymentType, LoanApplication, LoanDetails, LoanType, MaritalStatus, PersonalData, WorkInfo,
};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use proptest::sample::select;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{ApplicantFixtures, STANDARD_CATALOG};

/// Strategy for generating loan types
pub fn loan_type_strategy() -> impl Strategy<Value = LoanType> {
    select(LoanType::ALL.to_vec())
}

/// Strategy for generating employment types
pub fn employment_type_strategy() -> impl Strategy<Value = EmploymentType> {
    prop_oneof![Just(EmploymentType::Dependiente), Just(EmploymentType::Independiente)]
}

/// Strategy for generating marital statuses
pub fn marital_status_strategy() -> impl Strategy<Value = MaritalStatus> {
    prop_oneof![
        Just(MaritalStatus::Soltero),
        Just(MaritalStatus::Casado),
        Just(MaritalStatus::Divorciado),
        Just(MaritalStatus::Viudo),
    ]
}

/// Strategy for monthly incomes that pass the income floor (300 to 20000)
pub fn monthly_income_strategy() -> impl Strategy<Value = Decimal> {
    (300u32..=20_000u32).prop_map(Decimal::from)
}

/// Strategy for years in the current job, in tenths (0.0 to 10.0)
pub fn work_years_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100i64).prop_map(|n| Decimal::new(n, 1))
}

/// Strategy for an amount and term the product accepts
pub fn loan_request_strategy(loan_type: LoanType) -> impl Strategy<Value = LoanDetails> {
    let product = STANDARD_CATALOG.product(loan_type).clone();
    let (min, max) = (product.min_amount, product.max_amount);

    (0u32..=1000u32, select(product.terms)).prop_map(move |(step, term)| LoanDetails {
        amount: (min + (max - min) * Decimal::from(step) / dec!(1000)).round_dp(2),
        term,
        purpose: "capital de trabajo".to_string(),
        guarantee_type: None,
    })
}

/// Strategy for a loan type together with an accepted request
pub fn typed_loan_request_strategy() -> impl Strategy<Value = (LoanType, LoanDetails)> {
    loan_type_strategy().prop_flat_map(|loan_type| (Just(loan_type), loan_request_strategy(loan_type)))
}

/// Strategy for employment details
pub fn work_info_strategy() -> impl Strategy<Value = WorkInfo> {
    (employment_type_strategy(), monthly_income_strategy(), work_years_strategy()).prop_map(
        |(employment_type, monthly_income, work_years)| WorkInfo {
            employment_type,
            monthly_income,
            work_years,
            ..ApplicantFixtures::salaried_work_info()
        },
    )
}

/// Strategy for birth dates of adult applicants
pub fn birth_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1950i32..2005i32, 1u32..=12u32, 1u32..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("day 1-28 is valid in every month"))
}

/// Strategy for personal data that passes field validation
pub fn personal_data_strategy() -> impl Strategy<Value = PersonalData> {
    (
        "[A-Z][a-z]{2,10} [A-Z][a-z]{2,12}",
        "[0-9]{7,10}",
        birth_date_strategy(),
        marital_status_strategy(),
        "[0-9]{7,12}",
        "[a-z]{5,10}@[a-z]{3,8}\\.com",
        "Calle [A-Z][a-z]{3,12} [0-9]{1,4}",
        any::<bool>(),
    )
        .prop_map(
            |(full_name, document_id, birth_date, marital_status, phone, email, address, is_existing_client)| {
                PersonalData {
                    full_name,
                    document_id,
                    birth_date: Some(birth_date),
                    marital_status,
                    phone,
                    email,
                    address,
                    is_existing_client,
                }
            },
        )
}

/// Strategy for complete drafts with every document uploaded
pub fn application_strategy() -> impl Strategy<Value = LoanApplication> {
    (personal_data_strategy(), work_info_strategy(), typed_loan_request_strategy()).prop_map(
        |(personal_data, work_info, (loan_type, loan_details))| {
            LoanApplication::draft(
                &STANDARD_CATALOG,
                loan_type,
                personal_data,
                work_info,
                loan_details,
                ApplicantFixtures::all_documents(),
            )
            .expect("generated terms are never zero")
        },
    )
}

/// Random but valid personal data with a realistic name and email
pub fn random_personal_data() -> PersonalData {
    PersonalData {
        full_name: Name().fake(),
        email: SafeEmail().fake(),
        ..ApplicantFixtures::personal_data()
    }
}

/// Random document uploads, each either uploaded or pending
pub fn document_uploads_strategy() -> impl Strategy<Value = Vec<DocumentUpload>> {
    proptest::collection::vec(any::<bool>(), 3..=3).prop_map(|flags| {
        ApplicantFixtures::all_documents()
            .into_iter()
            .zip(flags)
            .map(|(doc, uploaded)| DocumentUpload { uploaded, ..doc })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_lending::{ApplicationValidator, CreditScoringEngine};
    use std::sync::Arc;

    proptest! {
        #[test]
        fn generated_requests_are_offered((loan_type, details) in typed_loan_request_strategy()) {
            let product = STANDARD_CATALOG.product(loan_type);
            prop_assert!(product.accepts_amount(details.amount));
            prop_assert!(product.accepts_term(details.term));
        }

        #[test]
        fn generated_applications_pass_validation(app in application_strategy()) {
            let result = ApplicationValidator::validate(&app, &STANDARD_CATALOG);
            prop_assert!(result.is_valid, "errors: {:?}", result.errors);
        }

        #[test]
        fn generated_scores_stay_on_scale(app in application_strategy()) {
            let score = CreditScoringEngine::new(Arc::clone(&STANDARD_CATALOG))
                .calculate(&app.work_info, &app.loan_details, app.is_existing_client())
                .unwrap();
            prop_assert!((300..=850).contains(&score.score));
        }
    }

    #[test]
    fn test_random_personal_data_is_filled() {
        let data = random_personal_data();
        assert!(!data.full_name.is_empty());
        assert!(data.email.contains('@'));
    }
}
